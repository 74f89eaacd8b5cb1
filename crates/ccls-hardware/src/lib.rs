//! Driver abstraction layer for the central lock system.
//!
//! This crate provides one trait per driver role the lock controller polls,
//! the concrete drivers behind them, and the factories that wire those
//! drivers to a board's pins.
//!
//! # Design Philosophy
//!
//! - **Poll-driven**: every method is synchronous and returns immediately,
//!   apart from the bounded actuator pulse.
//! - **Single context**: drivers are owned by one control loop and are not
//!   required to be `Send` or `Sync`.
//! - **Error-aware**: all operations return [`Result<T>`] so a failed
//!   driver surfaces to the control loop instead of being ignored.
//! - **Substitutable**: every role has a mock with a control handle.
//!
//! # Driver Traits
//!
//! | Trait | Role |
//! |-------|------|
//! | [`BluetoothDriver`] | line channel to the remote phone |
//! | [`PowerLocksDriver`] | lock/unlock actuator pulses |
//! | [`PushButtonDriver`] | manual lock/unlock buttons |
//! | [`RfReceiverDriver`] | key fob receiver of the Linx build |
//!
//! ```
//! use ccls_hardware::mock::{MockBluetooth, MockPowerLocks};
//! use ccls_hardware::traits::{BluetoothDriver, PowerLocksDriver};
//! use ccls_hardware::types::PulseKind;
//!
//! # fn main() -> ccls_hardware::Result<()> {
//! let (mut link, link_handle) = MockBluetooth::new();
//! let (mut locks, mut locks_handle) = MockPowerLocks::new();
//!
//! link_handle.send_line("lock")?;
//! if link.has_line()? && link.read_line()? == "lock" {
//!     locks.lock()?;
//! }
//!
//! assert_eq!(locks_handle.pulse_kinds(), vec![PulseKind::Lock]);
//! # Ok(())
//! # }
//! ```
//!
//! # Composition
//!
//! The [`factory`] module builds all drivers of a board at once from its
//! [`PinAssignment`](ccls_core::PinAssignment). The Bluetooth link can be a
//! terminal ([`console`]), a serial device (`serial`, behind the
//! `hardware-serial` feature) or a mock.
//!
//! [`BluetoothDriver`]: traits::BluetoothDriver
//! [`PowerLocksDriver`]: traits::PowerLocksDriver
//! [`PushButtonDriver`]: traits::PushButtonDriver
//! [`RfReceiverDriver`]: traits::RfReceiverDriver

pub mod console;
pub mod devices;
pub mod drivers;
pub mod error;
pub mod factory;
pub mod gpio;
pub mod line;
pub mod mock;
#[cfg(feature = "hardware-serial")]
pub mod serial;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{BluetoothDriver, PowerLocksDriver, PushButtonDriver, RfReceiverDriver};
pub use types::{DeviceInfo, PulseKind, PulseRecord};

// Re-export factory types
pub use factory::{
    BluetoothLink, DriverFactory, DriverSet, MockDriverFactory, MockDriverHandles,
    SimulatedLinxFactory, SimulatedUnoFactory,
};
