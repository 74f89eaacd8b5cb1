//! Session state machine of the Bluetooth lock system.
//!
//! The session moves linearly from connection to authentication:
//!
//! - `Init`: nothing sent yet
//! - `GreetingSent`: greeting written, no prompt yet
//! - `AwaitingUsername`: username prompt written
//! - `AwaitingPassword`: username accepted, password prompt written
//! - `Authenticated`: lock commands accepted
//!
//! # Valid Transitions
//!
//! - Init → GreetingSent → AwaitingUsername
//! - AwaitingUsername → AwaitingUsername (re-prompt) | AwaitingPassword
//! - AwaitingPassword → AwaitingUsername | Authenticated
//! - Authenticated → AwaitingUsername
//!
//! Any state returns to `Init` through [`StateMachine::reset`] (logout or
//! link reset), never through [`StateMachine::transition_to`].
//!
//! # Examples
//!
//! ```
//! use ccls_controller::{SessionState, StateMachine};
//!
//! let mut machine = StateMachine::new();
//! machine.transition_to(SessionState::GreetingSent).unwrap();
//! machine.transition_to(SessionState::AwaitingUsername).unwrap();
//!
//! assert!(machine.transition_to(SessionState::Authenticated).is_err());
//! assert_eq!(machine.current_state(), SessionState::AwaitingUsername);
//! ```

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use ccls_core::{Error, Result};

/// Maximum number of state transitions to keep in history.
///
/// A full login followed by a logout records nine transitions, so this keeps
/// roughly ten sessions of diagnostics.
pub const MAX_HISTORY_SIZE: usize = 100;

/// Authentication phase of the Bluetooth session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Fresh session, greeting not yet sent.
    Init,

    /// Greeting sent, username prompt pending.
    GreetingSent,

    /// Waiting for the username line.
    AwaitingUsername,

    /// Waiting for the password line.
    AwaitingPassword,

    /// Credentials accepted; lock commands are honoured.
    Authenticated,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            SessionState::Init => "Init",
            SessionState::GreetingSent => "GreetingSent",
            SessionState::AwaitingUsername => "AwaitingUsername",
            SessionState::AwaitingPassword => "AwaitingPassword",
            SessionState::Authenticated => "Authenticated",
        };
        write!(f, "{}", state_str)
    }
}

impl SessionState {
    /// Check if transition to target state is valid from this state.
    ///
    /// Returning to `Init` is never a regular transition; it only happens
    /// through [`StateMachine::reset`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ccls_controller::SessionState;
    ///
    /// assert!(SessionState::AwaitingPassword.can_transition_to(&SessionState::Authenticated));
    /// assert!(!SessionState::AwaitingUsername.can_transition_to(&SessionState::Authenticated));
    /// ```
    pub fn can_transition_to(&self, target: &SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Init, SessionState::GreetingSent)
                | (SessionState::GreetingSent, SessionState::AwaitingUsername)
                | (
                    SessionState::AwaitingUsername,
                    SessionState::AwaitingUsername | SessionState::AwaitingPassword
                )
                | (
                    SessionState::AwaitingPassword,
                    SessionState::AwaitingUsername | SessionState::Authenticated
                )
                | (SessionState::Authenticated, SessionState::AwaitingUsername)
        )
    }

    /// Returns `true` if lock commands are accepted in this state.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated)
    }
}

/// A single recorded state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: SessionState,

    /// The state transitioned to.
    pub to: SessionState,

    /// `true` when the change was a forced return to `Init`.
    pub reset: bool,
}

impl StateTransition {
    /// Record of a regular transition.
    pub fn new(from: SessionState, to: SessionState) -> Self {
        Self {
            from,
            to,
            reset: false,
        }
    }

    fn reset_from(from: SessionState) -> Self {
        Self {
            from,
            to: SessionState::Init,
            reset: true,
        }
    }
}

impl fmt::Display for StateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.reset {
            write!(f, "{} -> {} (reset)", self.from, self.to)
        } else {
            write!(f, "{} -> {}", self.from, self.to)
        }
    }
}

/// Transition-validating state holder with bounded history.
///
/// Not thread-safe; the lock system owns it from the single control loop.
#[derive(Debug, Clone)]
pub struct StateMachine {
    current_state: SessionState,
    history: VecDeque<StateTransition>,
}

impl StateMachine {
    /// Create a new state machine in the `Init` state.
    pub fn new() -> Self {
        Self {
            current_state: SessionState::Init,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        }
    }

    /// Get the current state.
    pub fn current_state(&self) -> SessionState {
        self.current_state
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Get the last `count` transitions, oldest first.
    pub fn last_transitions(&self, count: usize) -> Vec<StateTransition> {
        self.history
            .iter()
            .rev()
            .take(count)
            .rev()
            .copied()
            .collect()
    }

    /// Transition to a new state, validating the transition.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidStateTransition` if the transition is not in
    /// the transition table. The current state is left unchanged.
    pub fn transition_to(&mut self, new_state: SessionState) -> Result<StateTransition> {
        if !self.current_state.can_transition_to(&new_state) {
            return Err(Error::InvalidStateTransition {
                from: self.current_state.to_string(),
                to: new_state.to_string(),
            });
        }

        let transition = StateTransition::new(self.current_state, new_state);
        self.record(transition);
        Ok(transition)
    }

    /// Force the machine back to `Init` from any state.
    pub fn reset(&mut self) -> StateTransition {
        let transition = StateTransition::reset_from(self.current_state);
        self.record(transition);
        transition
    }

    fn record(&mut self, transition: StateTransition) {
        self.current_state = transition.to;
        if self.history.len() >= MAX_HISTORY_SIZE {
            self.history.pop_front();
        }
        self.history.push_back(transition);
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn authenticated_machine() -> StateMachine {
        let mut machine = StateMachine::new();
        machine.transition_to(SessionState::GreetingSent).unwrap();
        machine.transition_to(SessionState::AwaitingUsername).unwrap();
        machine.transition_to(SessionState::AwaitingPassword).unwrap();
        machine.transition_to(SessionState::Authenticated).unwrap();
        machine
    }

    #[test]
    fn test_new_machine_starts_in_init() {
        let machine = StateMachine::new();
        assert_eq!(machine.current_state(), SessionState::Init);
        assert!(machine.history().is_empty());
    }

    #[rstest]
    #[case(SessionState::Init, SessionState::GreetingSent, true)]
    #[case(SessionState::Init, SessionState::AwaitingUsername, false)]
    #[case(SessionState::GreetingSent, SessionState::AwaitingUsername, true)]
    #[case(SessionState::AwaitingUsername, SessionState::AwaitingUsername, true)]
    #[case(SessionState::AwaitingUsername, SessionState::AwaitingPassword, true)]
    #[case(SessionState::AwaitingUsername, SessionState::Authenticated, false)]
    #[case(SessionState::AwaitingPassword, SessionState::AwaitingPassword, false)]
    #[case(SessionState::AwaitingPassword, SessionState::AwaitingUsername, true)]
    #[case(SessionState::AwaitingPassword, SessionState::Authenticated, true)]
    #[case(SessionState::Authenticated, SessionState::AwaitingUsername, true)]
    #[case(SessionState::Authenticated, SessionState::AwaitingPassword, false)]
    #[case(SessionState::Authenticated, SessionState::Init, false)]
    fn test_transition_table(
        #[case] from: SessionState,
        #[case] to: SessionState,
        #[case] valid: bool,
    ) {
        assert_eq!(from.can_transition_to(&to), valid);
    }

    #[test]
    fn test_no_regular_transition_reaches_init() {
        let states = [
            SessionState::Init,
            SessionState::GreetingSent,
            SessionState::AwaitingUsername,
            SessionState::AwaitingPassword,
            SessionState::Authenticated,
        ];
        for state in states {
            assert!(!state.can_transition_to(&SessionState::Init), "{state}");
        }
    }

    #[test]
    fn test_invalid_transition_keeps_state() {
        let mut machine = StateMachine::new();
        let result = machine.transition_to(SessionState::Authenticated);

        assert!(matches!(
            result,
            Err(Error::InvalidStateTransition { ref from, ref to })
                if from == "Init" && to == "Authenticated"
        ));
        assert_eq!(machine.current_state(), SessionState::Init);
        assert!(machine.history().is_empty());
    }

    #[test]
    fn test_reset_from_authenticated() {
        let mut machine = authenticated_machine();
        let transition = machine.reset();

        assert_eq!(transition.from, SessionState::Authenticated);
        assert_eq!(transition.to, SessionState::Init);
        assert!(transition.reset);
        assert_eq!(machine.current_state(), SessionState::Init);
        assert_eq!(machine.history().len(), 5);
    }

    #[test]
    fn test_last_transitions() {
        let machine = authenticated_machine();
        let last = machine.last_transitions(2);

        assert_eq!(
            last,
            vec![
                StateTransition::new(SessionState::AwaitingUsername, SessionState::AwaitingPassword),
                StateTransition::new(SessionState::AwaitingPassword, SessionState::Authenticated),
            ]
        );
        assert_eq!(machine.last_transitions(50).len(), 4);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut machine = StateMachine::new();
        machine.transition_to(SessionState::GreetingSent).unwrap();
        machine.transition_to(SessionState::AwaitingUsername).unwrap();
        for _ in 0..MAX_HISTORY_SIZE + 10 {
            machine.transition_to(SessionState::AwaitingUsername).unwrap();
        }

        assert_eq!(machine.history().len(), MAX_HISTORY_SIZE);
        assert!(
            machine
                .history()
                .iter()
                .all(|t| t.from == SessionState::AwaitingUsername)
        );
    }

    #[test]
    fn test_transition_display() {
        let transition = StateTransition::new(SessionState::Init, SessionState::GreetingSent);
        assert_eq!(transition.to_string(), "Init -> GreetingSent");

        let mut machine = authenticated_machine();
        assert_eq!(machine.reset().to_string(), "Authenticated -> Init (reset)");
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&SessionState::AwaitingPassword).unwrap();
        assert_eq!(json, "\"awaiting_password\"");

        let state: SessionState = serde_json::from_str("\"authenticated\"").unwrap();
        assert!(state.is_authenticated());
    }
}
