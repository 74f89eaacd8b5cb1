//! Mock driver implementations for testing and development.
//!
//! This module provides a simulated driver for every role the controller
//! polls. Each mock comes with a handle that drives or observes it
//! programmatically without requiring physical hardware.

pub mod bluetooth;
pub mod power_locks;
pub mod push_button;
pub mod rf_receiver;

// Re-export commonly used types
pub use bluetooth::{MockBluetooth, MockBluetoothHandle};
pub use power_locks::{MockPowerLocks, MockPowerLocksHandle};
pub use push_button::{MockPushButton, MockPushButtonHandle};
pub use rf_receiver::{MockRfReceiver, MockRfReceiverHandle};
