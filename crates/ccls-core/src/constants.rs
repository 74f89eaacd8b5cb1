//! Protocol, timing and wiring constants for the central lock system.
//!
//! The serial protocol is line-oriented ASCII. The controller writes one
//! message per line, terminated by [`LINE_TERMINATOR`], and reads one
//! credential or command per line. The literal texts below are the fixed
//! wire vocabulary of the system:
//!
//! ```text
//! -> Bluetooth Central Lock System
//! -> Username:
//! <- alice
//! -> Password:
//! <- secret
//! -> Login successful
//! -> Commands: lock, unlock, logout
//! <- lock
//! -> Doors locked
//! ```
//!
//! # Usage
//!
//! ```
//! use ccls_core::constants::*;
//!
//! assert_eq!(CMD_LOCK, "lock");
//! assert!(GREETING_MESSAGE.len() < DEFAULT_MAX_LINE_LENGTH);
//! ```

use crate::types::{LinkPins, PinAssignment, PinNumber};

// ============================================================================
// Line Framing
// ============================================================================

/// Terminator appended to every line written to the remote peer.
pub const LINE_TERMINATOR: &str = "\r\n";

/// Byte that completes an incoming line. A preceding `\r` is stripped.
pub const LINE_DELIMITER: u8 = b'\n';

/// Default maximum accepted line length in bytes.
///
/// Matches the 64 byte receive buffer of the software serial port on the
/// reference board; anything longer would have been silently truncated there.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64;

/// Hard upper bound for a configured line length.
pub const MAX_LINE_LENGTH_LIMIT: usize = 1024;

// ============================================================================
// Session Messages
// ============================================================================

/// Sent once when a remote peer is first served, and again after logout.
pub const GREETING_MESSAGE: &str = "Bluetooth Central Lock System";

/// Prompt for the username line.
pub const USERNAME_PROMPT: &str = "Username:";

/// Prompt for the password line.
pub const PASSWORD_PROMPT: &str = "Password:";

/// Sent after a correct password.
pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";

/// Sent after a wrong username or password, before re-prompting.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";

/// Lists the session commands once authenticated.
pub const COMMAND_PROMPT: &str = "Commands: lock, unlock, logout";

/// Confirmation for the `lock` command.
pub const LOCKED_MESSAGE: &str = "Doors locked";

/// Confirmation for the `unlock` command.
pub const UNLOCKED_MESSAGE: &str = "Doors unlocked";

/// Confirmation for the `logout` command.
pub const LOGGED_OUT_MESSAGE: &str = "Logged out";

/// Prefix of the error echoed for an unrecognized command token.
pub const UNKNOWN_COMMAND_PREFIX: &str = "Unknown command: ";

/// Sent when an incoming line is oversized or malformed.
pub const LINE_REJECTED_MESSAGE: &str = "Input rejected";

// ============================================================================
// Session Commands
// ============================================================================

/// Pulse the lock actuator.
pub const CMD_LOCK: &str = "lock";

/// Pulse the unlock actuator.
pub const CMD_UNLOCK: &str = "unlock";

/// End the authenticated session.
pub const CMD_LOGOUT: &str = "logout";

// ============================================================================
// Default Credentials
// ============================================================================

/// Username used when no configuration provides one.
pub const DEFAULT_USERNAME: &str = "admin";

/// Password used when no configuration provides one.
pub const DEFAULT_PASSWORD: &str = "f150";

// ============================================================================
// Timing
// ============================================================================

/// Default duration of a lock/unlock actuator pulse in milliseconds.
pub const DEFAULT_PULSE_DURATION_MS: u64 = 250;

/// Maximum accepted actuator pulse duration in milliseconds.
///
/// Door lock solenoids overheat when energized for long periods.
pub const MAX_PULSE_DURATION_MS: u64 = 2_000;

/// Default control tick period in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Default baud rate of the Bluetooth serial module.
pub const DEFAULT_BAUD_RATE: u32 = 9_600;

// ============================================================================
// Pin Assignments
// ============================================================================

/// Wiring of the Bluetooth build on the Arduino Uno.
pub const UNO_PINS: PinAssignment = PinAssignment {
    link: LinkPins::Serial {
        tx: PinNumber::new(2),
        rx: PinNumber::new(3),
    },
    lock_output: PinNumber::new(4),
    unlock_output: PinNumber::new(5),
    lock_button: PinNumber::new(6),
    unlock_button: PinNumber::new(7),
};

/// Wiring of the Linx RF receiver build on the ATtiny84.
pub const ATTINY84_LINX_PINS: PinAssignment = PinAssignment {
    link: LinkPins::LinxReceiver {
        lock_data: PinNumber::new(0),
        unlock_data: PinNumber::new(1),
    },
    lock_output: PinNumber::new(2),
    unlock_output: PinNumber::new(3),
    lock_button: PinNumber::new(4),
    unlock_button: PinNumber::new(5),
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_fit_in_a_line() {
        for message in [
            GREETING_MESSAGE,
            USERNAME_PROMPT,
            PASSWORD_PROMPT,
            LOGIN_SUCCESS_MESSAGE,
            LOGIN_FAILED_MESSAGE,
            COMMAND_PROMPT,
            LOCKED_MESSAGE,
            UNLOCKED_MESSAGE,
            LOGGED_OUT_MESSAGE,
            LINE_REJECTED_MESSAGE,
        ] {
            assert!(message.len() <= DEFAULT_MAX_LINE_LENGTH, "{message}");
            assert!(!message.contains('\n'));
        }
    }

    #[test]
    fn test_builtin_pin_assignments_are_valid() {
        UNO_PINS.validate().unwrap();
        ATTINY84_LINX_PINS.validate().unwrap();
    }

    #[test]
    fn test_uno_pins_match_board_wiring() {
        assert_eq!(UNO_PINS.lock_output.as_u8(), 4);
        assert_eq!(UNO_PINS.unlock_output.as_u8(), 5);
        assert_eq!(UNO_PINS.lock_button.as_u8(), 6);
        assert_eq!(UNO_PINS.unlock_button.as_u8(), 7);
        assert_eq!(
            UNO_PINS.link,
            LinkPins::Serial {
                tx: PinNumber::new(2),
                rx: PinNumber::new(3),
            }
        );
    }
}
