//! Bounded accumulator turning a serial byte stream into lines.
//!
//! Serial links deliver bytes in arbitrary chunks. [`LineBuffer`] collects
//! them until a `\n`, strips an optional `\r`, and queues the result. Memory
//! stays bounded: a line longer than the limit is discarded up to its
//! terminator and reported once as [`HardwareError::LineTooLong`], and at
//! most [`MAX_PENDING_LINES`] complete lines are kept.

use crate::{HardwareError, Result};
use ccls_core::constants::LINE_DELIMITER;
use std::collections::VecDeque;
use tracing::warn;

/// Complete lines kept before further lines are dropped.
pub const MAX_PENDING_LINES: usize = 8;

/// Line accumulator for a byte-oriented link.
///
/// # Examples
///
/// ```
/// use ccls_hardware::line::LineBuffer;
///
/// let mut buffer = LineBuffer::new(64);
/// buffer.push_bytes(b"ali");
/// assert!(!buffer.has_line());
///
/// buffer.push_bytes(b"ce\r\nlo");
/// assert_eq!(buffer.pop_line().unwrap().unwrap(), "alice");
/// assert!(buffer.pop_line().is_none());
/// ```
#[derive(Debug)]
pub struct LineBuffer {
    partial: Vec<u8>,
    overflowed: bool,
    ready: VecDeque<Result<String>>,
    max_len: usize,
}

impl LineBuffer {
    /// Create a buffer accepting lines of at most `max_len` bytes.
    pub fn new(max_len: usize) -> Self {
        Self {
            partial: Vec::with_capacity(max_len + 1),
            overflowed: false,
            ready: VecDeque::new(),
            max_len,
        }
    }

    /// Feed received bytes.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            if byte == LINE_DELIMITER {
                self.finish_line();
            } else if self.overflowed {
                continue;
            } else if self.partial.len() > self.max_len {
                // One extra byte is allowed for a trailing '\r'.
                self.overflowed = true;
                self.partial.clear();
            } else {
                self.partial.push(byte);
            }
        }
    }

    fn finish_line(&mut self) {
        if self.partial.last() == Some(&b'\r') {
            self.partial.pop();
        }

        let line = if self.overflowed || self.partial.len() > self.max_len {
            Err(HardwareError::line_too_long(self.max_len))
        } else {
            String::from_utf8(std::mem::take(&mut self.partial))
                .map_err(|_| HardwareError::invalid_data("line is not valid UTF-8"))
        };

        self.partial.clear();
        self.overflowed = false;

        if self.ready.len() >= MAX_PENDING_LINES {
            warn!(pending = self.ready.len(), "Line queue full, dropping line");
            return;
        }
        self.ready.push_back(line);
    }

    /// Whether a complete line (or a rejected one) is queued.
    pub fn has_line(&self) -> bool {
        !self.ready.is_empty()
    }

    /// Take the oldest queued line.
    pub fn pop_line(&mut self) -> Option<Result<String>> {
        self.ready.pop_front()
    }

    /// Drop everything received so far.
    pub fn clear(&mut self) {
        self.partial.clear();
        self.overflowed = false;
        self.ready.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_lines_across_chunks() {
        let mut buffer = LineBuffer::new(16);
        buffer.push_bytes(b"al");
        buffer.push_bytes(b"ice\nsec");
        buffer.push_bytes(b"ret\r\n");

        assert_eq!(buffer.pop_line().unwrap().unwrap(), "alice");
        assert_eq!(buffer.pop_line().unwrap().unwrap(), "secret");
        assert!(!buffer.has_line());
    }

    #[test]
    fn test_line_at_limit_with_carriage_return() {
        let mut buffer = LineBuffer::new(4);
        buffer.push_bytes(b"lock\r\n");

        assert_eq!(buffer.pop_line().unwrap().unwrap(), "lock");
    }

    #[test]
    fn test_oversized_line_is_reported_once() {
        let mut buffer = LineBuffer::new(4);
        buffer.push_bytes(b"unlock-everything\nlock\n");

        assert!(matches!(
            buffer.pop_line(),
            Some(Err(HardwareError::LineTooLong { max: 4 }))
        ));
        assert_eq!(buffer.pop_line().unwrap().unwrap(), "lock");
        assert!(buffer.pop_line().is_none());
    }

    #[rstest]
    #[case::one_byte_over(b"locks\n")]
    #[case::one_byte_over_with_cr(b"locks\r\n")]
    #[case::far_over(b"unlock-everything\n")]
    #[case::cr_pushes_over(b"lock\r\r\n")]
    fn test_over_limit_rejected(#[case] bytes: &[u8]) {
        let mut buffer = LineBuffer::new(4);
        buffer.push_bytes(bytes);

        assert!(matches!(
            buffer.pop_line(),
            Some(Err(HardwareError::LineTooLong { max: 4 }))
        ));
        assert!(buffer.pop_line().is_none());
    }

    #[test]
    fn test_invalid_utf8() {
        let mut buffer = LineBuffer::new(16);
        buffer.push_bytes(&[0x61, 0xff, 0xfe, b'\n']);

        assert!(matches!(
            buffer.pop_line(),
            Some(Err(HardwareError::InvalidData { .. }))
        ));
    }

    #[test]
    fn test_pending_lines_bounded() {
        let mut buffer = LineBuffer::new(16);
        for _ in 0..MAX_PENDING_LINES + 3 {
            buffer.push_bytes(b"x\n");
        }

        let mut count = 0;
        while buffer.pop_line().is_some() {
            count += 1;
        }
        assert_eq!(count, MAX_PENDING_LINES);
    }

    #[test]
    fn test_clear() {
        let mut buffer = LineBuffer::new(16);
        buffer.push_bytes(b"alice\nsec");
        buffer.clear();
        buffer.push_bytes(b"ret\n");

        assert_eq!(buffer.pop_line().unwrap().unwrap(), "ret");
    }
}
