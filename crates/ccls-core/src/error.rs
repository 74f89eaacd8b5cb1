use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Serial line errors
    #[error("Line too long: {length} bytes exceeds limit of {max}")]
    LineTooLong { length: usize, max: usize },

    #[error("Malformed line: {0}")]
    MalformedLine(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // Credential errors
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    // Wiring errors
    #[error("Pin {pin} assigned to both {first} and {second}")]
    DuplicatePin {
        pin: u8,
        first: &'static str,
        second: &'static str,
    },

    // Session errors
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
