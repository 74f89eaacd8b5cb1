//! Driver capability traits.
//!
//! These traits are the contract between the lock controller and the
//! hardware it polls. Each driver role has exactly one trait; the controller
//! is generic over them so every role can be replaced by a test double.
//!
//! All methods are synchronous and non-blocking apart from the bounded
//! actuator pulse. The controller runs in a single polling context, so no
//! trait requires `Send` or `Sync`.
//!
//! Blanket implementations let a caller keep ownership of a driver and lend
//! it to the controller: `&mut T` for the link and the actuators, `&T` for
//! the buttons and the RF receiver, and `Box<T>` for the link, the
//! actuators and the buttons.

use crate::error::Result;
use crate::types::DeviceInfo;

/// Byte-oriented line channel over the Bluetooth radio.
///
/// # Contract
///
/// - [`has_line`](Self::has_line) never blocks.
/// - [`read_line`](Self::read_line) must only be called after `has_line`
///   returned `true`; otherwise it returns
///   [`HardwareError::NoLineAvailable`](crate::HardwareError::NoLineAvailable).
/// - [`write_line`](Self::write_line) appends the line terminator itself.
///
/// # Examples
///
/// ```
/// use ccls_hardware::traits::BluetoothDriver;
/// use ccls_hardware::Result;
///
/// fn echo<B: BluetoothDriver>(link: &mut B) -> Result<()> {
///     if link.has_line()? {
///         let line = link.read_line()?;
///         link.write_line(&line)?;
///     }
///     Ok(())
/// }
/// ```
pub trait BluetoothDriver {
    /// Check whether a complete line is pending.
    fn has_line(&mut self) -> Result<bool>;

    /// Take the pending line, without its terminator.
    fn read_line(&mut self) -> Result<String>;

    /// Send one line to the remote peer.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Whether a remote peer is currently attached.
    ///
    /// Links that cannot tell report `true`.
    fn is_connected(&mut self) -> Result<bool> {
        Ok(true)
    }

    /// Drop everything received but not yet read, complete lines and any
    /// partial one.
    ///
    /// Links without an input queue of their own keep the default no-op.
    fn discard_input(&mut self) -> Result<()> {
        Ok(())
    }

    /// Describe the device.
    fn info(&self) -> DeviceInfo;
}

/// Lock and unlock actuators.
///
/// Each call issues one bounded-duration pulse. Calls are fire-and-forget:
/// no sensor confirms the doors actually moved.
pub trait PowerLocksDriver {
    /// Pulse the lock actuator.
    fn lock(&mut self) -> Result<()>;

    /// Pulse the unlock actuator.
    fn unlock(&mut self) -> Result<()>;

    /// Describe the device.
    fn info(&self) -> DeviceInfo;
}

/// A polled push button.
///
/// Reports the current level only. Telling a new press apart from a held
/// button is the caller's job.
pub trait PushButtonDriver {
    /// Whether the button is held down right now.
    fn is_pressed(&self) -> Result<bool>;

    /// Describe the device.
    fn info(&self) -> DeviceInfo;
}

/// Key fob RF receiver with one decoded output per fob button.
///
/// Like [`PushButtonDriver`], levels are reported as-is and edge detection
/// is left to the caller.
pub trait RfReceiverDriver {
    /// Whether the fob lock button is being received.
    fn lock_requested(&self) -> Result<bool>;

    /// Whether the fob unlock button is being received.
    fn unlock_requested(&self) -> Result<bool>;

    /// Describe the device.
    fn info(&self) -> DeviceInfo;
}

impl<T: BluetoothDriver + ?Sized> BluetoothDriver for &mut T {
    fn has_line(&mut self) -> Result<bool> {
        (**self).has_line()
    }

    fn read_line(&mut self) -> Result<String> {
        (**self).read_line()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        (**self).write_line(line)
    }

    fn is_connected(&mut self) -> Result<bool> {
        (**self).is_connected()
    }

    fn discard_input(&mut self) -> Result<()> {
        (**self).discard_input()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: BluetoothDriver + ?Sized> BluetoothDriver for Box<T> {
    fn has_line(&mut self) -> Result<bool> {
        (**self).has_line()
    }

    fn read_line(&mut self) -> Result<String> {
        (**self).read_line()
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        (**self).write_line(line)
    }

    fn is_connected(&mut self) -> Result<bool> {
        (**self).is_connected()
    }

    fn discard_input(&mut self) -> Result<()> {
        (**self).discard_input()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: PowerLocksDriver + ?Sized> PowerLocksDriver for &mut T {
    fn lock(&mut self) -> Result<()> {
        (**self).lock()
    }

    fn unlock(&mut self) -> Result<()> {
        (**self).unlock()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: PowerLocksDriver + ?Sized> PowerLocksDriver for Box<T> {
    fn lock(&mut self) -> Result<()> {
        (**self).lock()
    }

    fn unlock(&mut self) -> Result<()> {
        (**self).unlock()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: PushButtonDriver + ?Sized> PushButtonDriver for &T {
    fn is_pressed(&self) -> Result<bool> {
        (**self).is_pressed()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: PushButtonDriver + ?Sized> PushButtonDriver for Box<T> {
    fn is_pressed(&self) -> Result<bool> {
        (**self).is_pressed()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

impl<T: RfReceiverDriver + ?Sized> RfReceiverDriver for &T {
    fn lock_requested(&self) -> Result<bool> {
        (**self).lock_requested()
    }

    fn unlock_requested(&self) -> Result<bool> {
        (**self).unlock_requested()
    }

    fn info(&self) -> DeviceInfo {
        (**self).info()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockBluetooth, MockPowerLocks, MockPushButton};
    use crate::types::PulseKind;

    fn drain<B: BluetoothDriver>(mut link: B) -> Vec<String> {
        let mut lines = Vec::new();
        while link.has_line().unwrap() {
            lines.push(link.read_line().unwrap());
        }
        lines
    }

    #[test]
    fn test_borrowed_bluetooth_driver() {
        let (mut link, handle) = MockBluetooth::new();
        handle.send_line("one").unwrap();
        handle.send_line("two").unwrap();

        assert_eq!(drain(&mut link), vec!["one", "two"]);
        assert!(!link.has_line().unwrap());
    }

    #[test]
    fn test_borrowed_bluetooth_discards_input() {
        let (mut link, handle) = MockBluetooth::new();
        handle.send_lines(["alice", "secret"]).unwrap();

        let mut boxed: Box<dyn BluetoothDriver + '_> = Box::new(&mut link);
        boxed.discard_input().unwrap();

        assert!(!boxed.has_line().unwrap());
    }

    #[test]
    fn test_boxed_drivers_as_trait_objects() {
        let (link, mut link_handle) = MockBluetooth::new();
        let (locks, mut locks_handle) = MockPowerLocks::new();
        let (button, button_handle) = MockPushButton::new();

        let mut link: Box<dyn BluetoothDriver> = Box::new(link);
        let mut locks: Box<dyn PowerLocksDriver> = Box::new(locks);
        let button: Box<dyn PushButtonDriver> = Box::new(button);

        link.write_line("hello").unwrap();
        locks.unlock().unwrap();
        button_handle.press();

        assert_eq!(link_handle.written_lines(), vec!["hello"]);
        assert_eq!(locks_handle.pulse_kinds(), vec![PulseKind::Unlock]);
        assert!(button.is_pressed().unwrap());
    }
}
