//! Core types for the Bluetooth central lock system.
//!
//! This crate holds the pieces shared by every other crate in the workspace:
//! the error type, the serial protocol and pin constants, and the small
//! validated value types (credentials, serial lines, session commands and
//! pin assignments). It performs no I/O.

pub mod constants;
pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
