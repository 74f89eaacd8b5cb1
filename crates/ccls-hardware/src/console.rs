//! Terminal-backed link for running the controller on a host.
//!
//! Standard input stands in for the phone typing into the Bluetooth
//! terminal and standard output for what the phone would display. A reader
//! thread forwards stdin lines over an unbounded channel so the control
//! loop can poll without blocking. End of input counts as the peer
//! disconnecting.

use crate::{HardwareError, Result, traits::BluetoothDriver, types::DeviceInfo};
use ccls_core::constants::LINE_TERMINATOR;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use tokio::sync::mpsc::{self, error::TryRecvError};
use tracing::{debug, warn};

/// Stdin/stdout link.
#[derive(Debug)]
pub struct ConsoleBluetooth {
    incoming_rx: mpsc::UnboundedReceiver<String>,
    pending: VecDeque<String>,
    closed: bool,
}

impl ConsoleBluetooth {
    /// Start reading standard input on a background thread.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::InitializationFailed`] if the reader thread
    /// cannot be spawned.
    pub fn spawn() -> Result<Self> {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("console-link".to_string())
            .spawn(move || {
                for line in std::io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if incoming_tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("Console input failed: {}", e);
                            break;
                        }
                    }
                }
                debug!("Console input closed");
            })
            .map_err(|e| HardwareError::initialization_failed(format!("console reader: {e}")))?;

        Ok(Self {
            incoming_rx,
            pending: VecDeque::new(),
            closed: false,
        })
    }

    fn poll(&mut self) {
        loop {
            match self.incoming_rx.try_recv() {
                Ok(line) => self.pending.push_back(line),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.closed = true;
                    break;
                }
            }
        }
    }
}

impl BluetoothDriver for ConsoleBluetooth {
    fn has_line(&mut self) -> Result<bool> {
        if self.pending.is_empty() {
            self.poll();
        }
        Ok(!self.pending.is_empty())
    }

    fn read_line(&mut self) -> Result<String> {
        self.pending
            .pop_front()
            .ok_or(HardwareError::NoLineAvailable)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{line}{LINE_TERMINATOR}")?;
        stdout.flush()?;
        Ok(())
    }

    fn discard_input(&mut self) -> Result<()> {
        self.poll();
        if !self.pending.is_empty() {
            debug!(dropped = self.pending.len(), "Discarded unread console lines");
            self.pending.clear();
        }
        Ok(())
    }

    fn is_connected(&mut self) -> Result<bool> {
        if !self.closed {
            self.poll();
        }
        Ok(!(self.closed && self.pending.is_empty()))
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Console", "stdin/stdout").with_wiring("terminal")
    }
}
