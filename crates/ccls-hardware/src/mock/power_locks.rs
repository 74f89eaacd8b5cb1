//! Mock lock actuators for testing and development.

use crate::{
    HardwareError, Result,
    traits::PowerLocksDriver,
    types::{DeviceInfo, PulseKind, PulseRecord},
};
use tokio::sync::{mpsc, watch};

/// Mock power locks that record every pulse instead of driving outputs.
///
/// A fault can be injected through the handle to make every pulse fail,
/// which exercises the controller's error path.
///
/// # Examples
///
/// ```
/// use ccls_hardware::mock::MockPowerLocks;
/// use ccls_hardware::traits::PowerLocksDriver;
/// use ccls_hardware::types::PulseKind;
///
/// # fn main() -> ccls_hardware::Result<()> {
/// let (mut locks, mut handle) = MockPowerLocks::new();
///
/// locks.lock()?;
/// locks.unlock()?;
///
/// assert_eq!(handle.pulse_kinds(), vec![PulseKind::Lock, PulseKind::Unlock]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct MockPowerLocks {
    /// Channel sender for recorded pulses
    pulse_tx: mpsc::UnboundedSender<PulseRecord>,

    /// Injected actuator fault
    fault_rx: watch::Receiver<bool>,

    /// Device name
    name: String,
}

impl MockPowerLocks {
    /// Create new mock power locks with the default name.
    pub fn new() -> (Self, MockPowerLocksHandle) {
        Self::with_name("Mock Power Locks".to_string())
    }

    /// Create new mock power locks with a custom name.
    pub fn with_name(name: String) -> (Self, MockPowerLocksHandle) {
        let (pulse_tx, pulse_rx) = mpsc::unbounded_channel();
        let (fault_tx, fault_rx) = watch::channel(false);

        let locks = Self {
            pulse_tx,
            fault_rx,
            name,
        };

        let handle = MockPowerLocksHandle { pulse_rx, fault_tx };

        (locks, handle)
    }

    fn pulse(&mut self, kind: PulseKind) -> Result<()> {
        if *self.fault_rx.borrow() {
            return Err(HardwareError::communication(format!(
                "{kind} actuator not responding"
            )));
        }
        // The handle may be gone; a dropped observer does not stop the doors.
        let _ = self.pulse_tx.send(PulseRecord::now(kind));
        Ok(())
    }
}

impl Default for MockPowerLocks {
    fn default() -> Self {
        Self::new().0
    }
}

impl PowerLocksDriver for MockPowerLocks {
    fn lock(&mut self) -> Result<()> {
        self.pulse(PulseKind::Lock)
    }

    fn unlock(&mut self) -> Result<()> {
        self.pulse(PulseKind::Unlock)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name.clone(), "Mock Power Locks v1.0")
    }
}

/// Handle for observing a mock power locks driver.
#[derive(Debug)]
pub struct MockPowerLocksHandle {
    /// Channel receiver for recorded pulses
    pulse_rx: mpsc::UnboundedReceiver<PulseRecord>,

    /// Injected actuator fault
    fault_tx: watch::Sender<bool>,
}

impl MockPowerLocksHandle {
    /// Drain every pulse recorded since the last call.
    pub fn pulses(&mut self) -> Vec<PulseRecord> {
        let mut pulses = Vec::new();
        while let Ok(pulse) = self.pulse_rx.try_recv() {
            pulses.push(pulse);
        }
        pulses
    }

    /// Drain pulses, keeping only their direction.
    pub fn pulse_kinds(&mut self) -> Vec<PulseKind> {
        self.pulses().into_iter().map(|pulse| pulse.kind).collect()
    }

    /// Make subsequent pulses fail (or succeed again).
    pub fn set_fault(&self, faulty: bool) {
        self.fault_tx.send_replace(faulty);
    }
}
