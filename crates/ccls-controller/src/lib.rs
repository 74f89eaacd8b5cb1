//! Central lock controllers.
//!
//! [`BluetoothCentralLockSystem`] authenticates a remote user over a
//! Bluetooth serial link before accepting lock commands.
//! [`KeyFobCentralLockSystem`] serves the RF key fob build. Both honour the
//! manual push buttons on every tick, independent of any session.
//!
//! Both are generic over the driver traits of `ccls-hardware` and are
//! driven by calling `run()` once per control tick from a single context.

pub mod central_lock;
pub mod config;
pub mod edge;
pub mod error;
pub mod keyfob;
pub mod state_machine;

pub use central_lock::BluetoothCentralLockSystem;
pub use config::SessionConfig;
pub use edge::EdgeDetector;
pub use error::{ControllerError, Result};
pub use keyfob::KeyFobCentralLockSystem;
pub use state_machine::{MAX_HISTORY_SIZE, SessionState, StateMachine, StateTransition};
