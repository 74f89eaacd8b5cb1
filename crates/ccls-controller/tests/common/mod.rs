//! Common test utilities for integration tests.
//!
//! [`Rig`] wires a [`BluetoothCentralLockSystem`] to mock drivers built by
//! the mock driver factory and plays the phone and the buttons.

#![allow(dead_code)]

use ccls_controller::{BluetoothCentralLockSystem, SessionConfig, SessionState, StateTransition};
use ccls_core::Credentials;
use ccls_hardware::{
    DriverFactory, MockDriverFactory, MockDriverHandles, PulseKind,
    mock::{MockBluetooth, MockPowerLocks, MockPushButton},
};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret";
pub const MAX_LINE_LENGTH: usize = 64;

pub type MockSystem = BluetoothCentralLockSystem<MockBluetooth, MockPowerLocks, MockPushButton>;

/// A lock system with handles on all its drivers.
pub struct Rig {
    pub system: MockSystem,
    pub handles: MockDriverHandles,
}

impl Rig {
    /// Fresh system expecting `alice`/`secret`. Nothing has run yet.
    pub fn new() -> Self {
        let credentials = Credentials::new(USERNAME, PASSWORD).unwrap();
        Self::with_config(SessionConfig::new(credentials, MAX_LINE_LENGTH).unwrap())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let (factory, handles) = MockDriverFactory::new();
        let system = BluetoothCentralLockSystem::from_drivers(factory.build().unwrap(), config);
        Self { system, handles }
    }

    /// Run one tick, failing the test on a driver error.
    pub fn tick(&mut self) {
        self.system.run().unwrap();
    }

    /// Send one line and run one tick.
    pub fn send(&mut self, line: &str) {
        self.handles.bluetooth.send_line(line).unwrap();
        self.tick();
    }

    /// Lines written to the phone since the last call.
    pub fn output(&mut self) -> Vec<String> {
        self.handles.bluetooth.written_lines()
    }

    /// Pulses issued since the last call.
    pub fn pulses(&mut self) -> Vec<PulseKind> {
        self.handles.power_locks.pulse_kinds()
    }

    pub fn state(&self) -> SessionState {
        self.system.state()
    }

    pub fn transitions(&self) -> Vec<StateTransition> {
        self.system.history().iter().copied().collect()
    }

    /// Greet, then log in with the correct credentials. Drains the output.
    pub fn login(&mut self) {
        self.tick();
        self.send(USERNAME);
        self.send(PASSWORD);
        assert_eq!(self.state(), SessionState::Authenticated);
        self.output();
    }
}

/// Assert the exact lines written since the last drain.
pub fn assert_output(rig: &mut Rig, expected: &[&str]) {
    let output = rig.output();
    assert_eq!(output, expected, "unexpected serial output");
}

/// Collapse the history into the sequence of states entered.
pub fn states_entered(transitions: &[StateTransition]) -> Vec<SessionState> {
    transitions.iter().map(|t| t.to).collect()
}
