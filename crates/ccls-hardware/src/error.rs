//! Error types for driver operations.
//!
//! This module defines the errors a driver can report: a lost link, a read
//! without a pending line, rejected input, and failures while opening or
//! talking to the underlying device.

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during driver operations.
#[derive(Debug, thiserror::Error)]
pub enum HardwareError {
    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// `read_line` was called while no line was pending.
    #[error("No line available")]
    NoLineAvailable,

    /// An incoming line exceeded the configured limit and was discarded.
    #[error("Line exceeds {max} bytes")]
    LineTooLong { max: usize },

    /// Operation is not supported by this device or build.
    #[error("Unsupported operation: {operation}")]
    Unsupported { operation: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Invalid data received from device.
    #[error("Invalid data: {message}")]
    InvalidData { message: String },

    /// Device initialization failed.
    #[error("Initialization failed: {message}")]
    InitializationFailed { message: String },

    /// Driver or wiring configuration error.
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HardwareError {
    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new line too long error.
    pub fn line_too_long(max: usize) -> Self {
        Self::LineTooLong { max }
    }

    /// Create a new unsupported operation error.
    pub fn unsupported(operation: impl Into<String>) -> Self {
        Self::Unsupported {
            operation: operation.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a new invalid data error.
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /// Create a new initialization failed error.
    pub fn initialization_failed(message: impl Into<String>) -> Self {
        Self::InitializationFailed {
            message: message.into(),
        }
    }

    /// Create a new configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// Returns `true` if the error concerns one rejected input line rather
    /// than the link itself.
    pub fn is_rejected_line(&self) -> bool {
        matches!(self, Self::LineTooLong { .. } | Self::InvalidData { .. })
    }
}

impl From<ccls_core::Error> for HardwareError {
    fn from(error: ccls_core::Error) -> Self {
        Self::configuration(error.to_string())
    }
}

#[cfg(feature = "hardware-serial")]
impl From<serialport::Error> for HardwareError {
    fn from(error: serialport::Error) -> Self {
        match error.kind() {
            serialport::ErrorKind::NoDevice => Self::disconnected(error.description),
            serialport::ErrorKind::Io(kind) => Self::Io(std::io::Error::new(kind, error.description)),
            _ => Self::communication(error.description),
        }
    }
}
