//! Operator control of the simulated inputs.
//!
//! On a host there are no physical buttons or key fob, so the terminal
//! doubles as the wiring. A line starting with `!` is a host command and
//! never reaches the lock controller:
//!
//! ```text
//! !press lock        hold the lock button down
//! !release lock      let it go
//! !press fob-unlock  key fob unlock button received
//! !release fob-unlock
//! ```
//!
//! Commands are only read from the local terminal. Lines arriving over a
//! serial Bluetooth module are never interpreted.

use std::collections::VecDeque;
use std::str::FromStr;

use ccls_core::{LinkPins, PinAssignment, PinNumber};
use ccls_hardware::{BluetoothDriver, DeviceInfo, HardwareError, Result, gpio::SimulatedGpio};
use thiserror::Error;
use tracing::{info, warn};

/// Prefix marking a host command line.
pub const COMMAND_PREFIX: char = '!';

#[derive(Error, Debug, PartialEq, Eq)]
pub enum HostCommandError {
    #[error("unknown action '{0}', expected press or release")]
    UnknownAction(String),

    #[error("unknown input '{0}', expected lock, unlock, fob-lock or fob-unlock")]
    UnknownInput(String),

    #[error("expected '!<press|release> <input>'")]
    Malformed,

    #[error("input {0} is not wired on this board")]
    NotWired(SimulatedInput),
}

/// A simulated input the operator can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedInput {
    LockButton,
    UnlockButton,
    FobLock,
    FobUnlock,
}

impl std::fmt::Display for SimulatedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::LockButton => "lock",
            Self::UnlockButton => "unlock",
            Self::FobLock => "fob-lock",
            Self::FobUnlock => "fob-unlock",
        })
    }
}

impl FromStr for SimulatedInput {
    type Err = HostCommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lock" => Ok(Self::LockButton),
            "unlock" => Ok(Self::UnlockButton),
            "fob-lock" => Ok(Self::FobLock),
            "fob-unlock" => Ok(Self::FobUnlock),
            _ => Err(HostCommandError::UnknownInput(s.to_string())),
        }
    }
}

/// One operator command: hold or let go of an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCommand {
    pub input: SimulatedInput,
    pub pressed: bool,
}

impl HostCommand {
    /// Parse a line, returning `None` if it is not a host command at all.
    pub fn parse(line: &str) -> Option<std::result::Result<Self, HostCommandError>> {
        let body = line.trim().strip_prefix(COMMAND_PREFIX)?;
        Some(body.parse())
    }
}

impl FromStr for HostCommand {
    type Err = HostCommandError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let (Some(action), Some(input), None) = (words.next(), words.next(), words.next()) else {
            return Err(HostCommandError::Malformed);
        };
        let pressed = match action.to_ascii_lowercase().as_str() {
            "press" => true,
            "release" => false,
            _ => return Err(HostCommandError::UnknownAction(action.to_string())),
        };
        Ok(Self {
            input: input.parse()?,
            pressed,
        })
    }
}

/// The operator's side of the simulated GPIO bank.
#[derive(Debug, Clone)]
pub struct HostInputs {
    gpio: SimulatedGpio,
    pins: PinAssignment,
}

impl HostInputs {
    /// `gpio` must be a clone of the bank the board's drivers were built on.
    pub fn new(gpio: SimulatedGpio, pins: PinAssignment) -> Self {
        Self { gpio, pins }
    }

    fn pin(&self, input: SimulatedInput) -> std::result::Result<PinNumber, HostCommandError> {
        match (input, self.pins.link) {
            (SimulatedInput::LockButton, _) => Ok(self.pins.lock_button),
            (SimulatedInput::UnlockButton, _) => Ok(self.pins.unlock_button),
            (SimulatedInput::FobLock, LinkPins::LinxReceiver { lock_data, .. }) => Ok(lock_data),
            (SimulatedInput::FobUnlock, LinkPins::LinxReceiver { unlock_data, .. }) => {
                Ok(unlock_data)
            }
            (input, LinkPins::Serial { .. }) => Err(HostCommandError::NotWired(input)),
        }
    }

    /// Drive the pin behind `command`.
    ///
    /// Buttons are pull-up inputs pressed low; fob data lines are active
    /// high.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the input is not wired on this board
    /// or its pin was never claimed by a driver.
    pub fn apply(&self, command: HostCommand) -> Result<()> {
        let pin = self
            .pin(command.input)
            .map_err(|e| HardwareError::configuration(e.to_string()))?;
        match command.input {
            SimulatedInput::LockButton | SimulatedInput::UnlockButton if command.pressed => {
                self.gpio.press(pin)
            }
            SimulatedInput::LockButton | SimulatedInput::UnlockButton => self.gpio.release(pin),
            SimulatedInput::FobLock | SimulatedInput::FobUnlock => {
                self.gpio.set_level(pin, command.pressed)
            }
        }?;
        info!(input = %command.input, pressed = command.pressed, %pin, "Simulated input driven");
        Ok(())
    }
}

/// Terminal reader that applies host commands and passes every other line
/// through.
///
/// Wraps the console Bluetooth link when the terminal is the phone, or a
/// command-only console on boards whose link does not use the terminal.
#[derive(Debug)]
pub struct CommandConsole<B> {
    link: B,
    inputs: HostInputs,
    pending: VecDeque<Result<String>>,
}

impl<B: BluetoothDriver> CommandConsole<B> {
    pub fn new(link: B, inputs: HostInputs) -> Self {
        Self {
            link,
            inputs,
            pending: VecDeque::new(),
        }
    }

    /// Apply any waiting host commands. Other lines are dropped with a
    /// warning, for terminals that carry nothing but commands.
    ///
    /// # Errors
    ///
    /// Returns the link's read failure.
    pub fn poll_commands(&mut self) -> Result<()> {
        while self.has_line()? {
            if let Ok(line) = self.read_line() {
                warn!(
                    len = line.len(),
                    "Ignoring console line, host commands start with '{COMMAND_PREFIX}'"
                );
            }
        }
        Ok(())
    }

    fn handle(&self, command: std::result::Result<HostCommand, HostCommandError>) {
        match command {
            Ok(command) => {
                if let Err(e) = self.inputs.apply(command) {
                    warn!(error = %e, "Host command failed");
                }
            }
            Err(e) => warn!(error = %e, "Invalid host command"),
        }
    }
}

impl<B: BluetoothDriver> BluetoothDriver for CommandConsole<B> {
    fn has_line(&mut self) -> Result<bool> {
        while self.pending.is_empty() && self.link.has_line()? {
            match self.link.read_line() {
                Ok(line) => match HostCommand::parse(&line) {
                    Some(command) => self.handle(command),
                    None => self.pending.push_back(Ok(line)),
                },
                Err(e) if e.is_rejected_line() => self.pending.push_back(Err(e)),
                Err(e) => return Err(e),
            }
        }
        Ok(!self.pending.is_empty())
    }

    fn read_line(&mut self) -> Result<String> {
        self.pending
            .pop_front()
            .unwrap_or(Err(HardwareError::NoLineAvailable))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        self.link.write_line(line)
    }

    fn is_connected(&mut self) -> Result<bool> {
        self.link.is_connected()
    }

    fn discard_input(&mut self) -> Result<()> {
        self.pending.clear();
        self.link.discard_input()
    }

    fn info(&self) -> DeviceInfo {
        self.link.info()
    }
}
