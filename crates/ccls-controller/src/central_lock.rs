//! Bluetooth-authenticated central lock controller.
//!
//! [`BluetoothCentralLockSystem`] is polled once per control tick. Each tick
//! it:
//!
//! 1. polls both push buttons and pulses the actuators on a new press,
//!    whatever the session state;
//! 2. resets the session if the Bluetooth peer went away, and stops there
//!    while no peer is attached;
//! 3. greets a fresh session and prompts for the username;
//! 4. handles at most one pending serial line according to the session
//!    state.
//!
//! # Serial session
//!
//! ```text
//! > Bluetooth Central Lock System
//! > Username:
//! < alice
//! > Password:
//! < secret
//! > Login successful
//! > Commands: lock, unlock, logout
//! < lock
//! > Doors locked
//! ```
//!
//! A wrong username or password answers `Login failed` and restarts at the
//! username prompt. There is no attempt counter.

use std::collections::VecDeque;

use ccls_core::{
    SerialLine, SessionCommand,
    constants::{
        COMMAND_PROMPT, GREETING_MESSAGE, LINE_REJECTED_MESSAGE, LOCKED_MESSAGE,
        LOGGED_OUT_MESSAGE, LOGIN_FAILED_MESSAGE, LOGIN_SUCCESS_MESSAGE, PASSWORD_PROMPT,
        UNKNOWN_COMMAND_PREFIX, UNLOCKED_MESSAGE, USERNAME_PROMPT,
    },
};
use ccls_hardware::{BluetoothDriver, DriverSet, PowerLocksDriver, PushButtonDriver};
use tracing::{debug, info, trace, warn};

use crate::{
    Result, SessionConfig,
    edge::EdgeDetector,
    state_machine::{SessionState, StateMachine, StateTransition},
};

/// Central lock controller reached over a Bluetooth serial link.
///
/// Owns its four drivers. Pass `&mut` references (links, actuators) or
/// `&` references (buttons) to keep ownership elsewhere.
///
/// # Examples
///
/// ```
/// use ccls_controller::{BluetoothCentralLockSystem, SessionConfig, SessionState};
/// use ccls_hardware::{DriverFactory, MockDriverFactory};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let (factory, mut handles) = MockDriverFactory::new();
/// let mut system =
///     BluetoothCentralLockSystem::from_drivers(factory.build()?, SessionConfig::default());
///
/// system.run()?;
/// assert_eq!(system.state(), SessionState::AwaitingUsername);
/// assert_eq!(
///     handles.bluetooth.written_lines(),
///     vec!["Bluetooth Central Lock System", "Username:"]
/// );
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BluetoothCentralLockSystem<B, L, P> {
    bluetooth: B,
    power_locks: L,
    lock_button: P,
    unlock_button: P,
    lock_edge: EdgeDetector,
    unlock_edge: EdgeDetector,
    machine: StateMachine,
    config: SessionConfig,
    /// Peer seen attached since the last reset.
    link_up: bool,
}

impl<B, L, P> BluetoothCentralLockSystem<B, L, P>
where
    B: BluetoothDriver,
    L: PowerLocksDriver,
    P: PushButtonDriver,
{
    pub fn new(
        bluetooth: B,
        power_locks: L,
        lock_button: P,
        unlock_button: P,
        config: SessionConfig,
    ) -> Self {
        info!(
            link = %bluetooth.info(),
            locks = %power_locks.info(),
            max_line_length = config.max_line_length(),
            "Bluetooth lock system ready"
        );
        Self {
            bluetooth,
            power_locks,
            lock_button,
            unlock_button,
            lock_edge: EdgeDetector::new(),
            unlock_edge: EdgeDetector::new(),
            machine: StateMachine::new(),
            config,
            link_up: false,
        }
    }

    /// Take the drivers built by a [`DriverFactory`](ccls_hardware::DriverFactory).
    pub fn from_drivers(drivers: DriverSet<B, L, P>, config: SessionConfig) -> Self {
        let (bluetooth, power_locks, lock_button, unlock_button) = drivers.into_parts();
        Self::new(bluetooth, power_locks, lock_button, unlock_button, config)
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.machine.current_state()
    }

    /// Recent session transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        self.machine.history()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// One control tick.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure. The session state stays consistent,
    /// so the caller can log the error and keep ticking.
    pub fn run(&mut self) -> Result<()> {
        self.poll_buttons()?;

        if !self.bluetooth.is_connected()? {
            if self.link_up {
                info!("Bluetooth peer disconnected");
                self.link_up = false;
                self.reset_bluetooth_connection_parameters()?;
            }
            return Ok(());
        }
        if !self.link_up {
            debug!("Bluetooth peer attached");
            self.link_up = true;
        }

        if self.state() == SessionState::Init {
            self.send_greeting_message()?;
        }

        if !self.bluetooth.has_line()? {
            trace!("No serial line pending");
            return Ok(());
        }

        match self.bluetooth.read_line() {
            Ok(raw) => self.handle_bluetooth_message(&raw),
            Err(e) if e.is_rejected_line() => {
                warn!(error = %e, state = %self.state(), "Serial line rejected by link");
                self.reject_line()
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Drop the session and any unread input, and start over with the
    /// greeting on the next tick.
    ///
    /// # Errors
    ///
    /// Returns the link's failure to discard its input. The session is
    /// reset either way.
    pub fn reset_link(&mut self) -> Result<()> {
        self.reset_bluetooth_connection_parameters()
    }

    fn poll_buttons(&mut self) -> Result<()> {
        let lock_pressed = self.lock_button.is_pressed()?;
        let unlock_pressed = self.unlock_button.is_pressed()?;

        if self.lock_edge.update(lock_pressed) {
            info!(state = %self.state(), "Lock button pressed");
            self.power_locks.lock()?;
        }
        if self.unlock_edge.update(unlock_pressed) {
            info!(state = %self.state(), "Unlock button pressed");
            self.power_locks.unlock()?;
        }
        Ok(())
    }

    fn send_greeting_message(&mut self) -> Result<()> {
        self.bluetooth.write_line(GREETING_MESSAGE)?;
        self.machine.transition_to(SessionState::GreetingSent)?;
        self.machine.transition_to(SessionState::AwaitingUsername)?;
        self.send_prompt()
    }

    fn send_prompt(&mut self) -> Result<()> {
        let prompt = match self.state() {
            SessionState::AwaitingUsername => USERNAME_PROMPT,
            SessionState::AwaitingPassword => PASSWORD_PROMPT,
            SessionState::Authenticated => COMMAND_PROMPT,
            SessionState::Init | SessionState::GreetingSent => return Ok(()),
        };
        debug!(prompt, "Sending prompt");
        self.bluetooth.write_line(prompt)?;
        Ok(())
    }

    fn reject_line(&mut self) -> Result<()> {
        self.bluetooth.write_line(LINE_REJECTED_MESSAGE)?;
        self.send_prompt()
    }

    fn handle_bluetooth_message(&mut self, raw: &str) -> Result<()> {
        let line = match SerialLine::parse(raw, self.config.max_line_length()) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, state = %self.state(), "Serial line rejected");
                return self.reject_line();
            }
        };

        if line.is_empty() {
            debug!(state = %self.state(), "Empty line");
            return self.send_prompt();
        }

        match self.state() {
            SessionState::AwaitingUsername => self.handle_username(&line),
            SessionState::AwaitingPassword => self.handle_password(&line),
            SessionState::Authenticated => self.handle_command(&line),
            // The greeting always precedes line handling
            SessionState::Init | SessionState::GreetingSent => Ok(()),
        }
    }

    fn handle_username(&mut self, line: &SerialLine) -> Result<()> {
        if self.config.credentials().verify_username(line.as_str()) {
            self.machine.transition_to(SessionState::AwaitingPassword)?;
            debug!("Username accepted");
            return self.send_prompt();
        }

        warn!("Login failed at username");
        self.login_failed()
    }

    fn handle_password(&mut self, line: &SerialLine) -> Result<()> {
        if self.config.credentials().verify_password(line.as_str()) {
            self.machine.transition_to(SessionState::Authenticated)?;
            info!("Session authenticated");
            self.bluetooth.write_line(LOGIN_SUCCESS_MESSAGE)?;
            return self.send_prompt();
        }

        warn!("Login failed at password");
        self.login_failed()
    }

    fn login_failed(&mut self) -> Result<()> {
        self.bluetooth.write_line(LOGIN_FAILED_MESSAGE)?;
        self.machine.transition_to(SessionState::AwaitingUsername)?;
        self.send_prompt()
    }

    fn handle_command(&mut self, line: &SerialLine) -> Result<()> {
        match line.as_str().parse::<SessionCommand>() {
            Ok(SessionCommand::Lock) => {
                info!("Lock requested over Bluetooth");
                self.power_locks.lock()?;
                self.bluetooth.write_line(LOCKED_MESSAGE)?;
            }
            Ok(SessionCommand::Unlock) => {
                info!("Unlock requested over Bluetooth");
                self.power_locks.unlock()?;
                self.bluetooth.write_line(UNLOCKED_MESSAGE)?;
            }
            Ok(SessionCommand::Logout) => {
                info!("Session logged out");
                self.bluetooth.write_line(LOGGED_OUT_MESSAGE)?;
                self.reset_bluetooth_connection_parameters()?;
                self.send_greeting_message()?;
            }
            Err(_) => {
                warn!(command = %line, "Unknown session command");
                self.bluetooth
                    .write_line(&format!("{UNKNOWN_COMMAND_PREFIX}{line}"))?;
            }
        }
        Ok(())
    }

    /// Back to `Init`. Lines typed before the reset must not reach the next
    /// session, so the link's unread input goes too.
    fn reset_bluetooth_connection_parameters(&mut self) -> Result<()> {
        let transition = self.machine.reset();
        info!(from = %transition.from, "Session reset");
        self.bluetooth.discard_input()?;
        Ok(())
    }
}
