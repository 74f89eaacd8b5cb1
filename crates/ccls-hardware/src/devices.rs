//! Enum wrapper for Bluetooth link dispatch.
//!
//! The host build picks its link at runtime (console, serial port, or a
//! mock in tests) while the controller stays generic over one concrete
//! [`BluetoothDriver`] type. [`AnyBluetoothDriver`] provides that type
//! with static dispatch per variant.
//!
//! # Examples
//!
//! ```
//! use ccls_hardware::devices::AnyBluetoothDriver;
//! use ccls_hardware::mock::MockBluetooth;
//! use ccls_hardware::traits::BluetoothDriver;
//!
//! # fn main() -> ccls_hardware::Result<()> {
//! let (link, handle) = MockBluetooth::new();
//! let mut link = AnyBluetoothDriver::Mock(link);
//!
//! handle.send_line("alice")?;
//! assert!(link.has_line()?);
//! # Ok(())
//! # }
//! ```

use crate::console::ConsoleBluetooth;
use crate::mock::MockBluetooth;
#[cfg(feature = "hardware-serial")]
use crate::serial::SerialBluetooth;
use crate::traits::BluetoothDriver;
use crate::{DeviceInfo, Result};

/// Enum wrapper over every Bluetooth link implementation.
#[derive(Debug)]
#[non_exhaustive]
pub enum AnyBluetoothDriver {
    /// Mock link for development and testing.
    Mock(MockBluetooth),

    /// Terminal link for running on a host.
    Console(ConsoleBluetooth),

    /// Bluetooth module on a host serial port.
    #[cfg(feature = "hardware-serial")]
    Serial(SerialBluetooth),
}

impl BluetoothDriver for AnyBluetoothDriver {
    fn has_line(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.has_line(),
            Self::Console(device) => device.has_line(),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.has_line(),
        }
    }

    fn read_line(&mut self) -> Result<String> {
        match self {
            Self::Mock(device) => device.read_line(),
            Self::Console(device) => device.read_line(),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.read_line(),
        }
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        match self {
            Self::Mock(device) => device.write_line(line),
            Self::Console(device) => device.write_line(line),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.write_line(line),
        }
    }

    fn is_connected(&mut self) -> Result<bool> {
        match self {
            Self::Mock(device) => device.is_connected(),
            Self::Console(device) => device.is_connected(),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.is_connected(),
        }
    }

    fn discard_input(&mut self) -> Result<()> {
        match self {
            Self::Mock(device) => device.discard_input(),
            Self::Console(device) => device.discard_input(),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.discard_input(),
        }
    }

    fn info(&self) -> DeviceInfo {
        match self {
            Self::Mock(device) => device.info(),
            Self::Console(device) => device.info(),
            #[cfg(feature = "hardware-serial")]
            Self::Serial(device) => device.info(),
        }
    }
}
