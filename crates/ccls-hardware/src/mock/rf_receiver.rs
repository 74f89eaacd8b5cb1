//! Mock key fob receiver for testing and development.

use crate::{Result, traits::RfReceiverDriver, types::DeviceInfo};
use tokio::sync::watch;

/// Levels of the two receiver data lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FobLines {
    lock: bool,
    unlock: bool,
}

/// Mock RF receiver whose data lines are driven through a handle.
///
/// # Examples
///
/// ```
/// use ccls_hardware::mock::MockRfReceiver;
/// use ccls_hardware::traits::RfReceiverDriver;
///
/// # fn main() -> ccls_hardware::Result<()> {
/// let (receiver, handle) = MockRfReceiver::new();
///
/// handle.hold_unlock();
/// assert!(receiver.unlock_requested()?);
/// assert!(!receiver.lock_requested()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockRfReceiver {
    lines_rx: watch::Receiver<FobLines>,
}

impl MockRfReceiver {
    /// Create a new idle mock receiver.
    pub fn new() -> (Self, MockRfReceiverHandle) {
        let (lines_tx, lines_rx) = watch::channel(FobLines::default());
        (Self { lines_rx }, MockRfReceiverHandle { lines_tx })
    }
}

impl Default for MockRfReceiver {
    fn default() -> Self {
        Self::new().0
    }
}

impl RfReceiverDriver for MockRfReceiver {
    fn lock_requested(&self) -> Result<bool> {
        Ok(self.lines_rx.borrow().lock)
    }

    fn unlock_requested(&self) -> Result<bool> {
        Ok(self.lines_rx.borrow().unlock)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Mock Linx Receiver", "Mock RF Receiver v1.0")
    }
}

/// Handle playing the key fob for a mock receiver.
#[derive(Debug)]
pub struct MockRfReceiverHandle {
    lines_tx: watch::Sender<FobLines>,
}

impl MockRfReceiverHandle {
    /// Start transmitting the lock button.
    pub fn hold_lock(&self) {
        self.lines_tx.send_modify(|lines| lines.lock = true);
    }

    /// Start transmitting the unlock button.
    pub fn hold_unlock(&self) {
        self.lines_tx.send_modify(|lines| lines.unlock = true);
    }

    /// Stop transmitting.
    pub fn release(&self) {
        self.lines_tx.send_replace(FobLines::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_rf_receiver_idle() {
        let (receiver, _handle) = MockRfReceiver::new();

        assert!(!receiver.lock_requested().unwrap());
        assert!(!receiver.unlock_requested().unwrap());
    }

    #[test]
    fn test_mock_rf_receiver_hold_and_release() {
        let (receiver, handle) = MockRfReceiver::new();

        handle.hold_lock();
        assert!(receiver.lock_requested().unwrap());
        assert!(!receiver.unlock_requested().unwrap());

        handle.hold_unlock();
        assert!(receiver.lock_requested().unwrap());
        assert!(receiver.unlock_requested().unwrap());

        handle.release();
        assert!(!receiver.lock_requested().unwrap());
        assert!(!receiver.unlock_requested().unwrap());
    }
}
