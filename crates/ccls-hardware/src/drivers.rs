//! GPIO-backed driver implementations.
//!
//! These are the concrete drivers a board factory wires to pins: relay
//! outputs for the lock actuators, push buttons on pull-up inputs, and the
//! decoder outputs of a Linx RF receiver.

use crate::{
    HardwareError, Result,
    gpio::{InputPin, OutputPin},
    traits::{PowerLocksDriver, PushButtonDriver, RfReceiverDriver},
    types::{DeviceInfo, PulseKind},
};
use ccls_core::constants::MAX_PULSE_DURATION_MS;
use std::time::Duration;
use tracing::info;

/// Lock actuators driven by two relay outputs.
///
/// A pulse drives the selected output high for `pulse` and back low. The
/// sleep happens on the calling context, which is the control loop; this is
/// the only bounded blocking step of a control tick.
#[derive(Debug)]
pub struct PulsePowerLocks<O: OutputPin> {
    lock_pin: O,
    unlock_pin: O,
    pulse: Duration,
}

impl<O: OutputPin> PulsePowerLocks<O> {
    /// Wire the actuators and drive both outputs low.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `pulse` exceeds the solenoid limit,
    /// or any pin error while idling the outputs.
    pub fn new(mut lock_pin: O, mut unlock_pin: O, pulse: Duration) -> Result<Self> {
        if pulse > Duration::from_millis(MAX_PULSE_DURATION_MS) {
            return Err(HardwareError::configuration(format!(
                "pulse of {}ms exceeds limit of {MAX_PULSE_DURATION_MS}ms",
                pulse.as_millis()
            )));
        }
        lock_pin.set_low()?;
        unlock_pin.set_low()?;
        Ok(Self {
            lock_pin,
            unlock_pin,
            pulse,
        })
    }

    /// Configured pulse length.
    pub fn pulse_duration(&self) -> Duration {
        self.pulse
    }

    fn pulse(&mut self, kind: PulseKind) -> Result<()> {
        let pin = match kind {
            PulseKind::Lock => &mut self.lock_pin,
            PulseKind::Unlock => &mut self.unlock_pin,
        };
        info!(%kind, pin = %pin.pin(), duration_ms = self.pulse.as_millis() as u64, "Actuator pulse");

        pin.set_high()?;
        if !self.pulse.is_zero() {
            std::thread::sleep(self.pulse);
        }
        pin.set_low()
    }
}

impl<O: OutputPin> PowerLocksDriver for PulsePowerLocks<O> {
    fn lock(&mut self) -> Result<()> {
        self.pulse(PulseKind::Lock)
    }

    fn unlock(&mut self) -> Result<()> {
        self.pulse(PulseKind::Unlock)
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Power locks", "Pulse relay")
            .with_wiring(format!("{}/{}", self.lock_pin.pin(), self.unlock_pin.pin()))
    }
}

/// Push button on a digital input.
#[derive(Debug)]
pub struct GpioPushButton<I: InputPin> {
    pin: I,
    active_low: bool,
    name: &'static str,
}

impl<I: InputPin> GpioPushButton<I> {
    /// Button wired between the pin and ground with a pull-up: pressed
    /// reads low.
    pub fn active_low(name: &'static str, pin: I) -> Self {
        Self {
            pin,
            active_low: true,
            name,
        }
    }

    /// Button wired to the supply with a pull-down: pressed reads high.
    pub fn active_high(name: &'static str, pin: I) -> Self {
        Self {
            pin,
            active_low: false,
            name,
        }
    }
}

impl<I: InputPin> PushButtonDriver for GpioPushButton<I> {
    fn is_pressed(&self) -> Result<bool> {
        Ok(self.pin.is_high()? != self.active_low)
    }

    fn info(&self) -> DeviceInfo {
        let model = if self.active_low {
            "Push button (active low)"
        } else {
            "Push button (active high)"
        };
        DeviceInfo::new(self.name, model).with_wiring(self.pin.pin().to_string())
    }
}

/// Linx RF receiver, read through its decoder data outputs.
///
/// The decoder holds an output high while the matching fob button is
/// being received.
#[derive(Debug)]
pub struct GpioRfReceiver<I: InputPin> {
    lock_data: I,
    unlock_data: I,
}

impl<I: InputPin> GpioRfReceiver<I> {
    /// Wire the receiver's two data outputs.
    pub fn new(lock_data: I, unlock_data: I) -> Self {
        Self {
            lock_data,
            unlock_data,
        }
    }
}

impl<I: InputPin> RfReceiverDriver for GpioRfReceiver<I> {
    fn lock_requested(&self) -> Result<bool> {
        self.lock_data.is_high()
    }

    fn unlock_requested(&self) -> Result<bool> {
        self.unlock_data.is_high()
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new("Linx receiver", "RXM decoder").with_wiring(format!(
            "{}/{}",
            self.lock_data.pin(),
            self.unlock_data.pin()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::SimulatedGpio;
    use ccls_core::PinNumber;

    const LOCK_OUT: PinNumber = PinNumber::new(4);
    const UNLOCK_OUT: PinNumber = PinNumber::new(5);
    const BUTTON: PinNumber = PinNumber::new(6);

    fn locks(gpio: &SimulatedGpio) -> PulsePowerLocks<crate::gpio::SimulatedOutputPin> {
        PulsePowerLocks::new(
            gpio.output(LOCK_OUT).unwrap(),
            gpio.output(UNLOCK_OUT).unwrap(),
            Duration::ZERO,
        )
        .unwrap()
    }

    #[test]
    fn test_pulse_returns_output_low() {
        let gpio = SimulatedGpio::new();
        let mut locks = locks(&gpio);

        locks.lock().unwrap();

        assert_eq!(gpio.rising_edges(LOCK_OUT), 1);
        assert_eq!(gpio.level(LOCK_OUT), Some(false));
        assert_eq!(gpio.rising_edges(UNLOCK_OUT), 0);
    }

    #[test]
    fn test_unlock_pulses_unlock_output() {
        let gpio = SimulatedGpio::new();
        let mut locks = locks(&gpio);

        locks.unlock().unwrap();
        locks.unlock().unwrap();

        assert_eq!(gpio.rising_edges(UNLOCK_OUT), 2);
        assert_eq!(gpio.rising_edges(LOCK_OUT), 0);
    }

    #[test]
    fn test_pulse_duration_limit() {
        let gpio = SimulatedGpio::new();
        let result = PulsePowerLocks::new(
            gpio.output(LOCK_OUT).unwrap(),
            gpio.output(UNLOCK_OUT).unwrap(),
            Duration::from_millis(MAX_PULSE_DURATION_MS + 1),
        );
        assert!(matches!(
            result,
            Err(HardwareError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_power_locks_info_lists_pins() {
        let gpio = SimulatedGpio::new();
        let locks = locks(&gpio);
        assert_eq!(locks.info().wiring, Some("D4/D5".to_string()));
    }

    #[test]
    fn test_active_low_button() {
        let gpio = SimulatedGpio::new();
        let button = GpioPushButton::active_low("Lock button", gpio.input_pullup(BUTTON).unwrap());

        assert!(!button.is_pressed().unwrap());
        gpio.set_level(BUTTON, false).unwrap();
        assert!(button.is_pressed().unwrap());
        assert_eq!(button.info().wiring, Some("D6".to_string()));
    }

    #[test]
    fn test_active_high_button() {
        let gpio = SimulatedGpio::new();
        let button = GpioPushButton::active_high("Unlock button", gpio.input(BUTTON).unwrap());

        assert!(!button.is_pressed().unwrap());
        gpio.set_level(BUTTON, true).unwrap();
        assert!(button.is_pressed().unwrap());
    }

    #[test]
    fn test_rf_receiver_data_lines() {
        let gpio = SimulatedGpio::new();
        let lock_data = PinNumber::new(0);
        let unlock_data = PinNumber::new(1);
        let receiver = GpioRfReceiver::new(
            gpio.input(lock_data).unwrap(),
            gpio.input(unlock_data).unwrap(),
        );

        assert!(!receiver.lock_requested().unwrap());
        gpio.set_level(unlock_data, true).unwrap();
        assert!(receiver.unlock_requested().unwrap());
        assert!(!receiver.lock_requested().unwrap());
    }
}
