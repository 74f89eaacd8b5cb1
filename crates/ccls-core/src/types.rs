use crate::{
    Result,
    constants::{CMD_LOCK, CMD_LOGOUT, CMD_UNLOCK, MAX_LINE_LENGTH_LIMIT},
    error::Error,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;

/// Microcontroller pin number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PinNumber(u8);

impl PinNumber {
    /// Create a pin number.
    #[must_use]
    pub const fn new(pin: u8) -> Self {
        PinNumber(pin)
    }

    /// Get the raw pin number.
    #[must_use]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }
}

impl fmt::Display for PinNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "D{}", self.0)
    }
}

/// Pins used by the remote link of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LinkPins {
    /// Bluetooth module on a software serial port.
    Serial { tx: PinNumber, rx: PinNumber },

    /// Linx RF receiver decoder outputs, one data line per key fob button.
    LinxReceiver {
        lock_data: PinNumber,
        unlock_data: PinNumber,
    },
}

/// Mapping of every driver role to a physical pin.
///
/// The controller never sees raw pin numbers; this assignment is consumed
/// once by the driver factory of the target board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinAssignment {
    /// Remote link pins.
    pub link: LinkPins,

    /// Lock actuator output.
    pub lock_output: PinNumber,

    /// Unlock actuator output.
    pub unlock_output: PinNumber,

    /// Lock push button input.
    pub lock_button: PinNumber,

    /// Unlock push button input.
    pub unlock_button: PinNumber,
}

impl PinAssignment {
    /// All pins of the assignment labelled with their role.
    pub fn roles(&self) -> Vec<(&'static str, PinNumber)> {
        let mut roles = match self.link {
            LinkPins::Serial { tx, rx } => vec![("serial tx", tx), ("serial rx", rx)],
            LinkPins::LinxReceiver {
                lock_data,
                unlock_data,
            } => vec![("receiver lock data", lock_data), ("receiver unlock data", unlock_data)],
        };
        roles.extend([
            ("lock output", self.lock_output),
            ("unlock output", self.unlock_output),
            ("lock button", self.lock_button),
            ("unlock button", self.unlock_button),
        ]);
        roles
    }

    /// Check that no pin is wired to two roles.
    ///
    /// # Errors
    /// Returns `Error::DuplicatePin` naming the first conflicting pair.
    pub fn validate(&self) -> Result<()> {
        let roles = self.roles();
        for (i, &(first, pin)) in roles.iter().enumerate() {
            if let Some(&(second, _)) = roles[i + 1..].iter().find(|(_, other)| *other == pin) {
                return Err(Error::DuplicatePin {
                    pin: pin.as_u8(),
                    first,
                    second,
                });
            }
        }
        Ok(())
    }
}

/// Board build of the central lock system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareTarget {
    /// Arduino Uno with a Bluetooth serial module.
    UnoBluetooth,

    /// ATtiny84 with a Linx RF key fob receiver.
    Attiny84Linx,
}

impl HardwareTarget {
    /// Default wiring of this board.
    #[must_use]
    pub fn default_pins(self) -> PinAssignment {
        match self {
            HardwareTarget::UnoBluetooth => crate::constants::UNO_PINS,
            HardwareTarget::Attiny84Linx => crate::constants::ATTINY84_LINX_PINS,
        }
    }
}

impl fmt::Display for HardwareTarget {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            HardwareTarget::UnoBluetooth => write!(f, "uno_bluetooth"),
            HardwareTarget::Attiny84Linx => write!(f, "attiny84_linx"),
        }
    }
}

/// The single expected username/password pair.
///
/// # Security
/// Both fields are compared in constant time, and `Debug` never prints the
/// password.
#[derive(Clone, Deserialize)]
#[serde(try_from = "RawCredentials")]
pub struct Credentials {
    username: String,
    password: String,
}

#[derive(Deserialize)]
struct RawCredentials {
    username: String,
    password: String,
}

impl TryFrom<RawCredentials> for Credentials {
    type Error = Error;

    fn try_from(raw: RawCredentials) -> Result<Self> {
        Credentials::new(&raw.username, &raw.password)
    }
}

impl Credentials {
    /// Create a credential pair.
    ///
    /// # Errors
    /// Returns `Error::InvalidCredentials` if either value is empty, has
    /// surrounding whitespace, or could never arrive on a single serial line.
    pub fn new(username: &str, password: &str) -> Result<Self> {
        Self::check_field("username", username)?;
        Self::check_field("password", password)?;
        Ok(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    fn check_field(name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            return Err(Error::InvalidCredentials(format!("{name} must not be empty")));
        }
        if value.trim() != value {
            return Err(Error::InvalidCredentials(format!(
                "{name} must not start or end with whitespace"
            )));
        }
        if !value.bytes().all(is_printable_ascii) {
            return Err(Error::InvalidCredentials(format!(
                "{name} must be printable ASCII"
            )));
        }
        if value.len() > MAX_LINE_LENGTH_LIMIT {
            return Err(Error::InvalidCredentials(format!(
                "{name} must be at most {MAX_LINE_LENGTH_LIMIT} bytes"
            )));
        }
        Ok(())
    }

    /// Get the expected username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Longest of the two fields, in bytes.
    #[must_use]
    pub fn longest_field(&self) -> usize {
        self.username.len().max(self.password.len())
    }

    /// Check a candidate username in constant time.
    #[must_use]
    pub fn verify_username(&self, candidate: &str) -> bool {
        self.username.as_bytes().ct_eq(candidate.as_bytes()).into()
    }

    /// Check a candidate password in constant time.
    #[must_use]
    pub fn verify_password(&self, candidate: &str) -> bool {
        self.password.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: crate::constants::DEFAULT_USERNAME.to_string(),
            password: crate::constants::DEFAULT_PASSWORD.to_string(),
        }
    }
}

fn is_printable_ascii(b: u8) -> bool {
    (0x20..=0x7e).contains(&b)
}

/// One validated line of serial input.
///
/// Line terminators and surrounding whitespace are removed. A line may be
/// empty, which callers treat as "re-prompt".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialLine(String);

impl SerialLine {
    /// Validate a raw line read from the link.
    ///
    /// # Errors
    /// Returns `Error::LineTooLong` if the line exceeds `max_len` bytes, or
    /// `Error::MalformedLine` if it contains anything but printable ASCII.
    pub fn parse(raw: &str, max_len: usize) -> Result<Self> {
        let stripped = raw.trim_end_matches(['\r', '\n']);
        if stripped.len() > max_len {
            return Err(Error::LineTooLong {
                length: stripped.len(),
                max: max_len,
            });
        }

        let trimmed = stripped.trim_matches(|c: char| c.is_ascii_whitespace());
        if let Some(bad) = trimmed.bytes().find(|b| !is_printable_ascii(*b)) {
            return Err(Error::MalformedLine(format!(
                "unexpected byte 0x{bad:02x}"
            )));
        }

        Ok(SerialLine(trimmed.to_string()))
    }

    /// Get the line text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if nothing but whitespace was received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SerialLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Command accepted from an authenticated session.
///
/// Parsing is case-insensitive: `lock`, `LOCK` and `Lock` are equivalent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionCommand {
    Lock,
    Unlock,
    Logout,
}

impl SessionCommand {
    /// Wire keyword of the command.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            SessionCommand::Lock => CMD_LOCK,
            SessionCommand::Unlock => CMD_UNLOCK,
            SessionCommand::Logout => CMD_LOGOUT,
        }
    }
}

impl fmt::Display for SessionCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.keyword())
    }
}

impl std::str::FromStr for SessionCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        [
            SessionCommand::Lock,
            SessionCommand::Unlock,
            SessionCommand::Logout,
        ]
        .into_iter()
        .find(|command| command.keyword().eq_ignore_ascii_case(s.trim()))
        .ok_or_else(|| Error::UnknownCommand(s.to_string()))
    }
}
