//! Mock Bluetooth link for testing and development.
//!
//! This module provides a simulated serial link that can be fed lines and
//! inspected programmatically, without a radio attached.

use crate::{HardwareError, Result, traits::BluetoothDriver, types::DeviceInfo};
use std::collections::VecDeque;
use tokio::sync::{mpsc, watch};
use tracing::debug;

/// Mock Bluetooth serial link.
///
/// Lines injected through a [`MockBluetoothHandle`] become readable by the
/// driver; lines written by the driver are collected by the handle. The
/// channels are unbounded and polled with `try_recv`, so no runtime is
/// needed.
///
/// # Examples
///
/// ```
/// use ccls_hardware::mock::MockBluetooth;
/// use ccls_hardware::traits::BluetoothDriver;
///
/// # fn main() -> ccls_hardware::Result<()> {
/// let (mut link, mut handle) = MockBluetooth::new();
///
/// handle.send_line("alice")?;
/// assert!(link.has_line()?);
/// assert_eq!(link.read_line()?, "alice");
///
/// link.write_line("Password:")?;
/// assert_eq!(handle.written_lines(), vec!["Password:"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockBluetooth {
    /// Lines sent by the simulated remote peer
    incoming_rx: mpsc::UnboundedReceiver<String>,

    /// Lines already taken off the channel by `has_line`
    pending: VecDeque<String>,

    /// Lines written by the controller
    outgoing_tx: mpsc::UnboundedSender<String>,

    /// Simulated peer connection state
    connected_rx: watch::Receiver<bool>,

    /// Device name
    name: String,
}

impl MockBluetooth {
    /// Create a new connected mock link with the default name.
    pub fn new() -> (Self, MockBluetoothHandle) {
        Self::with_name("Mock Bluetooth".to_string())
    }

    /// Create a new connected mock link with a custom name.
    pub fn with_name(name: String) -> (Self, MockBluetoothHandle) {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        let (outgoing_tx, outgoing_rx) = mpsc::unbounded_channel();
        let (connected_tx, connected_rx) = watch::channel(true);

        let link = Self {
            incoming_rx,
            pending: VecDeque::new(),
            outgoing_tx,
            connected_rx,
            name: name.clone(),
        };

        let handle = MockBluetoothHandle {
            incoming_tx,
            outgoing_rx,
            connected_tx,
            name,
        };

        (link, handle)
    }
}

impl Default for MockBluetooth {
    fn default() -> Self {
        Self::new().0
    }
}

impl BluetoothDriver for MockBluetooth {
    fn has_line(&mut self) -> Result<bool> {
        if self.pending.is_empty() {
            if let Ok(line) = self.incoming_rx.try_recv() {
                self.pending.push_back(line);
            }
        }
        Ok(!self.pending.is_empty())
    }

    fn read_line(&mut self) -> Result<String> {
        if let Some(line) = self.pending.pop_front() {
            return Ok(line);
        }
        self.incoming_rx
            .try_recv()
            .map_err(|_| HardwareError::NoLineAvailable)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.outgoing_tx
            .send(line.to_string())
            .map_err(|_| HardwareError::disconnected("Bluetooth output channel closed"))
    }

    fn is_connected(&mut self) -> Result<bool> {
        Ok(*self.connected_rx.borrow())
    }

    fn discard_input(&mut self) -> Result<()> {
        let mut dropped = self.pending.len();
        self.pending.clear();
        while self.incoming_rx.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "Discarded unread mock lines");
        }
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock Bluetooth v1.0")
    }
}

/// Handle for controlling a mock Bluetooth link.
///
/// Plays the role of the remote phone: sends lines, reads what the
/// controller wrote, and connects or disconnects.
#[derive(Debug)]
pub struct MockBluetoothHandle {
    /// Channel sender for simulated remote lines
    incoming_tx: mpsc::UnboundedSender<String>,

    /// Channel receiver for lines written by the controller
    outgoing_rx: mpsc::UnboundedReceiver<String>,

    /// Simulated peer connection state
    connected_tx: watch::Sender<bool>,

    /// Device name
    name: String,
}

impl MockBluetoothHandle {
    /// Send a line as if typed by the remote peer.
    ///
    /// # Errors
    ///
    /// Returns an error if the link has been dropped.
    pub fn send_line(&self, line: impl Into<String>) -> Result<()> {
        self.incoming_tx
            .send(line.into())
            .map_err(|_| HardwareError::disconnected("Bluetooth input channel closed"))
    }

    /// Send several lines in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the link has been dropped.
    pub fn send_lines<I, S>(&self, lines: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for line in lines {
            self.send_line(line)?;
        }
        Ok(())
    }

    /// Drain every line written by the controller since the last call.
    pub fn written_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(line) = self.outgoing_rx.try_recv() {
            lines.push(line);
        }
        lines
    }

    /// Attach or detach the simulated remote peer.
    pub fn set_connected(&self, connected: bool) {
        self.connected_tx.send_replace(connected);
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_bluetooth_no_line() {
        let (mut link, _handle) = MockBluetooth::new();

        assert!(!link.has_line().unwrap());
        assert!(matches!(
            link.read_line(),
            Err(HardwareError::NoLineAvailable)
        ));
    }

    #[test]
    fn test_mock_bluetooth_lines_in_order() {
        let (mut link, handle) = MockBluetooth::new();
        handle.send_lines(["alice", "secret", "lock"]).unwrap();

        let mut received = Vec::new();
        while link.has_line().unwrap() {
            received.push(link.read_line().unwrap());
        }

        assert_eq!(received, vec!["alice", "secret", "lock"]);
    }

    #[test]
    fn test_mock_bluetooth_has_line_is_idempotent() {
        let (mut link, handle) = MockBluetooth::new();
        handle.send_line("alice").unwrap();

        assert!(link.has_line().unwrap());
        assert!(link.has_line().unwrap());
        assert_eq!(link.read_line().unwrap(), "alice");
        assert!(!link.has_line().unwrap());
    }

    #[test]
    fn test_mock_bluetooth_discard_input() {
        let (mut link, handle) = MockBluetooth::new();
        handle.send_lines(["alice", "secret", "lock"]).unwrap();
        assert!(link.has_line().unwrap());

        link.discard_input().unwrap();
        assert!(!link.has_line().unwrap());

        handle.send_line("bob").unwrap();
        assert_eq!(link.read_line().unwrap(), "bob");
    }

    #[test]
    fn test_mock_bluetooth_written_lines_drain() {
        let (mut link, mut handle) = MockBluetooth::new();

        link.write_line("Username:").unwrap();
        link.write_line("Password:").unwrap();

        assert_eq!(handle.written_lines(), vec!["Username:", "Password:"]);
        assert!(handle.written_lines().is_empty());
    }

    #[test]
    fn test_mock_bluetooth_connection_state() {
        let (mut link, handle) = MockBluetooth::new();
        assert!(link.is_connected().unwrap());

        handle.set_connected(false);
        assert!(!link.is_connected().unwrap());

        handle.set_connected(true);
        assert!(link.is_connected().unwrap());
    }

    #[test]
    fn test_mock_bluetooth_write_after_handle_dropped() {
        let (mut link, handle) = MockBluetooth::with_name("HC-05".to_string());
        assert_eq!(handle.name(), "HC-05");
        drop(handle);

        let result = link.write_line("Username:");
        assert!(matches!(result, Err(HardwareError::Disconnected { .. })));
    }
}
