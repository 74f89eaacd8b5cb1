//! Mock push button for testing and development.

use crate::{Result, traits::PushButtonDriver, types::DeviceInfo};
use tokio::sync::watch;

/// Mock push button whose level is set through a handle.
///
/// # Examples
///
/// ```
/// use ccls_hardware::mock::MockPushButton;
/// use ccls_hardware::traits::PushButtonDriver;
///
/// # fn main() -> ccls_hardware::Result<()> {
/// let (button, handle) = MockPushButton::new();
/// assert!(!button.is_pressed()?);
///
/// handle.press();
/// assert!(button.is_pressed()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockPushButton {
    level_rx: watch::Receiver<bool>,
    name: String,
}

impl MockPushButton {
    /// Create a new released mock button with the default name.
    pub fn new() -> (Self, MockPushButtonHandle) {
        Self::with_name("Mock Push Button".to_string())
    }

    /// Create a new released mock button with a custom name.
    pub fn with_name(name: String) -> (Self, MockPushButtonHandle) {
        let (level_tx, level_rx) = watch::channel(false);
        (Self { level_rx, name }, MockPushButtonHandle { level_tx })
    }
}

impl Default for MockPushButton {
    fn default() -> Self {
        Self::new().0
    }
}

impl PushButtonDriver for MockPushButton {
    fn is_pressed(&self) -> Result<bool> {
        Ok(*self.level_rx.borrow())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock Push Button v1.0")
    }
}

/// Handle for pressing and releasing a mock push button.
#[derive(Debug)]
pub struct MockPushButtonHandle {
    level_tx: watch::Sender<bool>,
}

impl MockPushButtonHandle {
    /// Hold the button down.
    pub fn press(&self) {
        self.level_tx.send_replace(true);
    }

    /// Let the button go.
    pub fn release(&self) {
        self.level_tx.send_replace(false);
    }

    /// Current simulated level.
    pub fn is_pressed(&self) -> bool {
        *self.level_tx.borrow()
    }
}
