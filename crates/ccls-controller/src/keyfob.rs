//! Key fob central lock controller for the Linx receiver build.
//!
//! No session and no authentication: the fob pairing of the RF receiver is
//! the trust boundary. Every new press of a fob button or a push button
//! pulses the matching actuator once.

use ccls_hardware::{DriverSet, PowerLocksDriver, PushButtonDriver, RfReceiverDriver};
use tracing::info;

use crate::{Result, edge::EdgeDetector};

/// Edge detectors of one lock/unlock input pair.
#[derive(Debug, Default)]
struct InputPair {
    lock: EdgeDetector,
    unlock: EdgeDetector,
}

/// Central lock controller driven by a key fob receiver and push buttons.
#[derive(Debug)]
pub struct KeyFobCentralLockSystem<R, L, P> {
    receiver: R,
    power_locks: L,
    lock_button: P,
    unlock_button: P,
    fob: InputPair,
    buttons: InputPair,
}

impl<R, L, P> KeyFobCentralLockSystem<R, L, P>
where
    R: RfReceiverDriver,
    L: PowerLocksDriver,
    P: PushButtonDriver,
{
    pub fn new(receiver: R, power_locks: L, lock_button: P, unlock_button: P) -> Self {
        info!(receiver = %receiver.info(), locks = %power_locks.info(), "Key fob lock system ready");
        Self {
            receiver,
            power_locks,
            lock_button,
            unlock_button,
            fob: InputPair::default(),
            buttons: InputPair::default(),
        }
    }

    /// Take the drivers built by a [`DriverFactory`](ccls_hardware::DriverFactory).
    pub fn from_drivers(drivers: DriverSet<R, L, P>) -> Self {
        let (receiver, power_locks, lock_button, unlock_button) = drivers.into_parts();
        Self::new(receiver, power_locks, lock_button, unlock_button)
    }

    /// One control tick.
    ///
    /// # Errors
    ///
    /// Returns the first driver failure.
    pub fn run(&mut self) -> Result<()> {
        let lock_button = self.lock_button.is_pressed()?;
        let unlock_button = self.unlock_button.is_pressed()?;
        let fob_lock = self.receiver.lock_requested()?;
        let fob_unlock = self.receiver.unlock_requested()?;

        if self.buttons.lock.update(lock_button) {
            info!("Lock button pressed");
            self.power_locks.lock()?;
        }
        if self.buttons.unlock.update(unlock_button) {
            info!("Unlock button pressed");
            self.power_locks.unlock()?;
        }
        if self.fob.lock.update(fob_lock) {
            info!("Key fob lock received");
            self.power_locks.lock()?;
        }
        if self.fob.unlock.update(fob_unlock) {
            info!("Key fob unlock received");
            self.power_locks.unlock()?;
        }
        Ok(())
    }
}
