use ccls_core::{
    Credentials, Error, Result,
    constants::{DEFAULT_MAX_LINE_LENGTH, MAX_LINE_LENGTH_LIMIT},
};

/// Session settings of a [`BluetoothCentralLockSystem`](crate::BluetoothCentralLockSystem).
#[derive(Debug, Clone)]
pub struct SessionConfig {
    credentials: Credentials,
    max_line_length: usize,
}

impl SessionConfig {
    /// Build a session configuration.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `max_line_length` is zero, above
    /// `MAX_LINE_LENGTH_LIMIT`, or too short to ever carry the credentials.
    pub fn new(credentials: Credentials, max_line_length: usize) -> Result<Self> {
        if max_line_length == 0 || max_line_length > MAX_LINE_LENGTH_LIMIT {
            return Err(Error::Config(format!(
                "max_line_length must be between 1 and {MAX_LINE_LENGTH_LIMIT}, got {max_line_length}"
            )));
        }
        if credentials.longest_field() > max_line_length {
            return Err(Error::Config(format!(
                "credentials do not fit in a {max_line_length} byte line"
            )));
        }

        Ok(Self {
            credentials,
            max_line_length,
        })
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}
