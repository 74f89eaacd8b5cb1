//! Digital pin abstraction and an in-memory pin bank.
//!
//! The concrete drivers in [`crate::drivers`] are written against the
//! [`InputPin`] and [`OutputPin`] traits, so the same driver code runs on
//! a board's GPIO port or on the [`SimulatedGpio`] bank used by the host
//! build and by tests.

use crate::{HardwareError, Result};
use ccls_core::PinNumber;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// A digital output.
pub trait OutputPin {
    /// Drive the pin high.
    fn set_high(&mut self) -> Result<()>;

    /// Drive the pin low.
    fn set_low(&mut self) -> Result<()>;

    /// Pin this output is attached to.
    fn pin(&self) -> PinNumber;
}

/// A digital input.
pub trait InputPin {
    /// Read the current level.
    fn is_high(&self) -> Result<bool>;

    /// Pin this input is attached to.
    fn pin(&self) -> PinNumber;
}

/// Direction a simulated pin was claimed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
}

#[derive(Debug, Clone, Copy)]
struct PinState {
    mode: PinMode,
    level: bool,
    rising_edges: u32,
}

/// Shared in-memory pin bank.
///
/// Each pin can be claimed once, as input or output. Clones share the same
/// bank, so a test (or the host binary) keeps one clone to drive inputs and
/// observe outputs while the drivers own the claimed pins.
///
/// # Examples
///
/// ```
/// use ccls_core::PinNumber;
/// use ccls_hardware::gpio::{InputPin, OutputPin, SimulatedGpio};
///
/// # fn main() -> ccls_hardware::Result<()> {
/// let gpio = SimulatedGpio::new();
///
/// let mut led = gpio.output(PinNumber::new(13))?;
/// led.set_high()?;
/// assert_eq!(gpio.level(PinNumber::new(13)), Some(true));
///
/// let button = gpio.input_pullup(PinNumber::new(6))?;
/// assert!(button.is_high()?);
/// gpio.set_level(PinNumber::new(6), false)?;
/// assert!(!button.is_high()?);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulatedGpio {
    bank: Arc<Mutex<BTreeMap<PinNumber, PinState>>>,
}

impl SimulatedGpio {
    /// Create an empty bank.
    pub fn new() -> Self {
        Self::default()
    }

    fn claim(&self, pin: PinNumber, mode: PinMode, level: bool) -> Result<()> {
        let mut bank = self.bank.lock();
        if let Some(existing) = bank.get(&pin) {
            return Err(HardwareError::configuration(format!(
                "pin {pin} already claimed as {:?}",
                existing.mode
            )));
        }
        bank.insert(
            pin,
            PinState {
                mode,
                level,
                rising_edges: 0,
            },
        );
        debug!(%pin, ?mode, level, "Pin claimed");
        Ok(())
    }

    /// Claim a pin as an output, initially low.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pin is already claimed.
    pub fn output(&self, pin: PinNumber) -> Result<SimulatedOutputPin> {
        self.claim(pin, PinMode::Output, false)?;
        Ok(SimulatedOutputPin {
            pin,
            gpio: self.clone(),
        })
    }

    /// Claim a pin as a floating input, initially low.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pin is already claimed.
    pub fn input(&self, pin: PinNumber) -> Result<SimulatedInputPin> {
        self.claim(pin, PinMode::Input, false)?;
        Ok(SimulatedInputPin {
            pin,
            gpio: self.clone(),
        })
    }

    /// Claim a pin as an input with pull-up, initially high.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pin is already claimed.
    pub fn input_pullup(&self, pin: PinNumber) -> Result<SimulatedInputPin> {
        self.claim(pin, PinMode::Input, true)?;
        Ok(SimulatedInputPin {
            pin,
            gpio: self.clone(),
        })
    }

    /// Drive a claimed input from outside, as a wire would.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pin is unclaimed or an output.
    pub fn set_level(&self, pin: PinNumber, level: bool) -> Result<()> {
        let mut bank = self.bank.lock();
        match bank.get_mut(&pin) {
            Some(state) if state.mode == PinMode::Input => {
                Self::apply(state, level);
                Ok(())
            }
            Some(_) => Err(HardwareError::configuration(format!(
                "pin {pin} is an output and cannot be driven externally"
            ))),
            None => Err(HardwareError::configuration(format!(
                "pin {pin} is not claimed"
            ))),
        }
    }

    /// Press a pull-up button wired to `pin` (pulls the input low).
    ///
    /// # Errors
    ///
    /// Same as [`set_level`](Self::set_level).
    pub fn press(&self, pin: PinNumber) -> Result<()> {
        self.set_level(pin, false)
    }

    /// Release a pull-up button wired to `pin`.
    ///
    /// # Errors
    ///
    /// Same as [`set_level`](Self::set_level).
    pub fn release(&self, pin: PinNumber) -> Result<()> {
        self.set_level(pin, true)
    }

    /// Current level of a claimed pin.
    pub fn level(&self, pin: PinNumber) -> Option<bool> {
        self.bank.lock().get(&pin).map(|state| state.level)
    }

    /// Number of low-to-high transitions a pin has seen.
    pub fn rising_edges(&self, pin: PinNumber) -> u32 {
        self.bank
            .lock()
            .get(&pin)
            .map_or(0, |state| state.rising_edges)
    }

    /// Mode a pin was claimed with, if any.
    pub fn mode(&self, pin: PinNumber) -> Option<PinMode> {
        self.bank.lock().get(&pin).map(|state| state.mode)
    }

    fn apply(state: &mut PinState, level: bool) {
        if level && !state.level {
            state.rising_edges += 1;
        }
        state.level = level;
    }

    fn write(&self, pin: PinNumber, level: bool) -> Result<()> {
        let mut bank = self.bank.lock();
        let state = bank
            .get_mut(&pin)
            .ok_or_else(|| HardwareError::configuration(format!("pin {pin} is not claimed")))?;
        Self::apply(state, level);
        trace!(%pin, level, "Output written");
        Ok(())
    }

    fn read(&self, pin: PinNumber) -> Result<bool> {
        self.level(pin)
            .ok_or_else(|| HardwareError::configuration(format!("pin {pin} is not claimed")))
    }
}

/// Output pin claimed from a [`SimulatedGpio`] bank.
#[derive(Debug)]
pub struct SimulatedOutputPin {
    pin: PinNumber,
    gpio: SimulatedGpio,
}

impl OutputPin for SimulatedOutputPin {
    fn set_high(&mut self) -> Result<()> {
        self.gpio.write(self.pin, true)
    }

    fn set_low(&mut self) -> Result<()> {
        self.gpio.write(self.pin, false)
    }

    fn pin(&self) -> PinNumber {
        self.pin
    }
}

/// Input pin claimed from a [`SimulatedGpio`] bank.
#[derive(Debug)]
pub struct SimulatedInputPin {
    pin: PinNumber,
    gpio: SimulatedGpio,
}

impl InputPin for SimulatedInputPin {
    fn is_high(&self) -> Result<bool> {
        self.gpio.read(self.pin)
    }

    fn pin(&self) -> PinNumber {
        self.pin
    }
}
