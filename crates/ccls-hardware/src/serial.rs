//! Bluetooth serial module attached to a host serial port.
//!
//! HC-05 style modules expose the radio link as a plain UART. On a host the
//! module shows up as a serial device (`/dev/rfcomm0`, `/dev/ttyUSB0`,
//! `COM3`), which this driver opens with the `serialport` crate.

use crate::{
    Result,
    line::LineBuffer,
    traits::BluetoothDriver,
    types::DeviceInfo,
};
use ccls_core::constants::LINE_TERMINATOR;
use serialport::{ClearBuffer, SerialPort};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info, trace};

/// Read timeout of the underlying port.
///
/// Reads are only issued for bytes already reported as available, so this
/// only bounds a misbehaving driver.
const PORT_TIMEOUT: Duration = Duration::from_millis(10);

/// Bluetooth link over a host serial port.
pub struct SerialBluetooth {
    port: Box<dyn SerialPort>,
    buffer: LineBuffer,
    path: String,
    baud_rate: u32,
}

impl SerialBluetooth {
    /// Open the serial device of the Bluetooth module.
    ///
    /// # Errors
    ///
    /// Returns an error if the port cannot be opened.
    pub fn open(path: &str, baud_rate: u32, max_line_length: usize) -> Result<Self> {
        info!(path, baud_rate, "Opening Bluetooth serial port");
        let port = serialport::new(path, baud_rate)
            .timeout(PORT_TIMEOUT)
            .open()?;

        Ok(Self {
            port,
            buffer: LineBuffer::new(max_line_length),
            path: path.to_string(),
            baud_rate,
        })
    }

    fn fill_buffer(&mut self) -> Result<()> {
        let available = self.port.bytes_to_read()? as usize;
        if available == 0 {
            return Ok(());
        }

        let mut chunk = vec![0u8; available];
        let read = self.port.read(&mut chunk)?;
        trace!(bytes = read, "Serial bytes received");
        self.buffer.push_bytes(&chunk[..read]);
        Ok(())
    }
}

impl std::fmt::Debug for SerialBluetooth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialBluetooth")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish_non_exhaustive()
    }
}

impl BluetoothDriver for SerialBluetooth {
    fn has_line(&mut self) -> Result<bool> {
        if !self.buffer.has_line() {
            self.fill_buffer()?;
        }
        Ok(self.buffer.has_line())
    }

    fn read_line(&mut self) -> Result<String> {
        self.buffer
            .pop_line()
            .unwrap_or(Err(crate::HardwareError::NoLineAvailable))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        debug!(len = line.len(), "Serial line sent");
        self.port.write_all(line.as_bytes())?;
        self.port.write_all(LINE_TERMINATOR.as_bytes())?;
        self.port.flush()?;
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        self.buffer.clear();
        self.port.clear(ClearBuffer::Input)?;
        debug!("Serial input discarded");
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Bluetooth serial", format!("UART {} baud", self.baud_rate))
            .with_wiring(self.path.clone())
    }
}
