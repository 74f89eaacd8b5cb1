use ccls_hardware::HardwareError;
use thiserror::Error;

/// Errors surfaced by one control tick.
#[derive(Error, Debug)]
pub enum ControllerError {
    #[error("Driver error: {0}")]
    Hardware(#[from] HardwareError),

    #[error(transparent)]
    Core(#[from] ccls_core::Error),
}

pub type Result<T> = std::result::Result<T, ControllerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hardware_error_converts() {
        let err: ControllerError = HardwareError::disconnected("HC-05").into();
        assert!(matches!(err, ControllerError::Hardware(_)));
        assert!(err.to_string().starts_with("Driver error"));
    }

    #[test]
    fn test_core_error_is_transparent() {
        let err: ControllerError = ccls_core::Error::Config("bad".to_string()).into();
        assert_eq!(err.to_string(), "Configuration error: bad");
    }
}
