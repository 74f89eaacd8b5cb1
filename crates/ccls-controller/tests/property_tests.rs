//! Property-based tests for the session state machine.
//!
//! These tests use proptest to drive the lock system with random line and
//! button sequences and check the authentication and pulse invariants.

mod common;

use ccls_controller::SessionState;
use ccls_hardware::PulseKind;
use common::{PASSWORD, Rig, USERNAME};
use proptest::prelude::*;

/// Strategy for one line from the phone, biased towards meaningful input.
fn session_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(USERNAME.to_string()),
        Just(PASSWORD.to_string()),
        Just("lock".to_string()),
        Just("unlock".to_string()),
        Just("logout".to_string()),
        Just(String::new()),
        prop::string::string_regex("[ -~]{0,80}").expect("line regex"),
    ]
}

/// Reference model: state expected after a line, ignoring rejected lines.
fn expected_state(state: SessionState, line: &str) -> SessionState {
    if line.len() > common::MAX_LINE_LENGTH {
        return state;
    }
    let line = line.trim();
    if line.is_empty() {
        return state;
    }
    match state {
        SessionState::AwaitingUsername if line == USERNAME => SessionState::AwaitingPassword,
        SessionState::AwaitingUsername => SessionState::AwaitingUsername,
        SessionState::AwaitingPassword if line == PASSWORD => SessionState::Authenticated,
        SessionState::AwaitingPassword => SessionState::AwaitingUsername,
        SessionState::Authenticated if line.eq_ignore_ascii_case("logout") => {
            SessionState::AwaitingUsername
        }
        other => other,
    }
}

proptest! {
    /// Property: every step follows the reference model, and `Authenticated`
    /// is entered only right after the correct username then password.
    #[test]
    fn prop_authentication_requires_username_then_password(
        lines in prop::collection::vec(session_line(), 0..40)
    ) {
        let mut rig = Rig::new();
        rig.tick();
        let mut model = SessionState::AwaitingUsername;
        let mut previous: Vec<String> = Vec::new();

        for line in &lines {
            let before = rig.state();
            rig.send(line);
            model = expected_state(model, line);
            prop_assert_eq!(rig.state(), model, "after {:?}", line);

            if before != SessionState::Authenticated && rig.state() == SessionState::Authenticated {
                prop_assert_eq!(line.trim(), PASSWORD);
                let accepted: Vec<&String> = previous
                    .iter()
                    .rev()
                    .filter(|l| !l.trim().is_empty() && l.len() <= common::MAX_LINE_LENGTH)
                    .take(1)
                    .collect();
                prop_assert_eq!(accepted.first().map(|l| l.trim()), Some(USERNAME));
            }
            previous.push(line.clone());
        }
    }

    /// Property: a non-matching password always returns to AwaitingUsername.
    #[test]
    fn prop_wrong_password_returns_to_username(
        guess in prop::string::string_regex("[!-~]{1,40}").expect("guess regex")
    ) {
        prop_assume!(guess != PASSWORD);

        let mut rig = Rig::new();
        rig.tick();
        rig.send(USERNAME);
        rig.send(&guess);

        prop_assert_eq!(rig.state(), SessionState::AwaitingUsername);
    }

    /// Property: one pulse per press, whatever the session does meanwhile.
    #[test]
    fn prop_one_pulse_per_press(
        levels in prop::collection::vec(any::<bool>(), 1..60),
        lines in prop::collection::vec(session_line(), 0..10)
    ) {
        let mut rig = Rig::new();
        let mut presses = 0;
        let mut held = false;

        for (i, &level) in levels.iter().enumerate() {
            if level {
                rig.handles.unlock_button.press();
            } else {
                rig.handles.unlock_button.release();
            }
            if level && !held {
                presses += 1;
            }
            held = level;

            // Interleave session traffic; keep it from issuing unlock pulses.
            match lines.get(i) {
                Some(line) if !line.trim().eq_ignore_ascii_case("unlock") => {
                    rig.send(line);
                }
                _ => rig.tick(),
            }
        }

        let unlocks = rig
            .pulses()
            .into_iter()
            .filter(|kind| *kind == PulseKind::Unlock)
            .count();
        prop_assert_eq!(unlocks, presses);
    }
}
