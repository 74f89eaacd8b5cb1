//! Composition root: one driver factory per hardware target.
//!
//! A factory turns a board's fixed wiring ([`PinAssignment`]) into the four
//! driver instances the controller needs. [`DriverFactory::build`] consumes
//! the factory, so each driver is constructed exactly once; the resulting
//! [`DriverSet`] owns them for the rest of the process.
//!
//! ```text
//!                 ┌──────────────┐
//! PinAssignment ─►│ DriverFactory│──build()──► DriverSet { link, power_locks,
//!                 └──────────────┘                        lock_button, unlock_button }
//! ```
//!
//! # Examples
//!
//! ```
//! use ccls_hardware::factory::{DriverFactory, MockDriverFactory};
//! use ccls_hardware::traits::PushButtonDriver;
//!
//! # fn main() -> ccls_hardware::Result<()> {
//! let (factory, handles) = MockDriverFactory::new();
//! let drivers = factory.build()?;
//!
//! handles.lock_button.press();
//! assert!(drivers.lock_button().is_pressed()?);
//! # Ok(())
//! # }
//! ```

use crate::{
    HardwareError, Result,
    devices::AnyBluetoothDriver,
    drivers::{GpioPushButton, GpioRfReceiver, PulsePowerLocks},
    gpio::{SimulatedGpio, SimulatedInputPin, SimulatedOutputPin},
    mock::{
        MockBluetooth, MockBluetoothHandle, MockPowerLocks, MockPowerLocksHandle, MockPushButton,
        MockPushButtonHandle,
    },
    traits::{BluetoothDriver, PowerLocksDriver, PushButtonDriver, RfReceiverDriver},
};
use ccls_core::{
    LinkPins, PinAssignment,
    constants::{ATTINY84_LINX_PINS, DEFAULT_PULSE_DURATION_MS, UNO_PINS},
};
use std::time::Duration;
use tracing::info;

/// The drivers of one board, owned for the lifetime of the process.
#[derive(Debug)]
pub struct DriverSet<Link, Locks, Button> {
    link: Link,
    power_locks: Locks,
    lock_button: Button,
    unlock_button: Button,
}

impl<Link, Locks, Button> DriverSet<Link, Locks, Button>
where
    Locks: PowerLocksDriver,
    Button: PushButtonDriver,
{
    /// Bundle already constructed drivers.
    pub fn new(link: Link, power_locks: Locks, lock_button: Button, unlock_button: Button) -> Self {
        Self {
            link,
            power_locks,
            lock_button,
            unlock_button,
        }
    }

    /// Remote link (Bluetooth module or RF receiver).
    pub fn link(&mut self) -> &mut Link {
        &mut self.link
    }

    /// Lock/unlock actuators.
    pub fn power_locks(&mut self) -> &mut Locks {
        &mut self.power_locks
    }

    /// Manual lock button.
    pub fn lock_button(&self) -> &Button {
        &self.lock_button
    }

    /// Manual unlock button.
    pub fn unlock_button(&self) -> &Button {
        &self.unlock_button
    }

    /// Split into `(link, power_locks, lock_button, unlock_button)`.
    pub fn into_parts(self) -> (Link, Locks, Button, Button) {
        (
            self.link,
            self.power_locks,
            self.lock_button,
            self.unlock_button,
        )
    }
}

/// Builds the drivers of one hardware target.
pub trait DriverFactory {
    /// Remote link driver type.
    type Link;

    /// Actuator driver type.
    type PowerLocks: PowerLocksDriver;

    /// Push button driver type.
    type Button: PushButtonDriver;

    /// Construct every driver, consuming the factory.
    fn build(self) -> Result<DriverSet<Self::Link, Self::PowerLocks, Self::Button>>;
}

/// Handles for observing and driving the drivers of a [`MockDriverFactory`].
#[derive(Debug)]
pub struct MockDriverHandles {
    pub bluetooth: MockBluetoothHandle,
    pub power_locks: MockPowerLocksHandle,
    pub lock_button: MockPushButtonHandle,
    pub unlock_button: MockPushButtonHandle,
}

/// Factory producing mock drivers for every role.
#[derive(Debug)]
pub struct MockDriverFactory {
    drivers: DriverSet<MockBluetooth, MockPowerLocks, MockPushButton>,
}

impl MockDriverFactory {
    /// Create the factory together with the handles of its drivers.
    pub fn new() -> (Self, MockDriverHandles) {
        let (bluetooth, bluetooth_handle) = MockBluetooth::new();
        let (power_locks, power_locks_handle) = MockPowerLocks::new();
        let (lock_button, lock_button_handle) = MockPushButton::with_name("Lock button".to_string());
        let (unlock_button, unlock_button_handle) =
            MockPushButton::with_name("Unlock button".to_string());

        let factory = Self {
            drivers: DriverSet::new(bluetooth, power_locks, lock_button, unlock_button),
        };
        let handles = MockDriverHandles {
            bluetooth: bluetooth_handle,
            power_locks: power_locks_handle,
            lock_button: lock_button_handle,
            unlock_button: unlock_button_handle,
        };
        (factory, handles)
    }
}

impl DriverFactory for MockDriverFactory {
    type Link = MockBluetooth;
    type PowerLocks = MockPowerLocks;
    type Button = MockPushButton;

    fn build(self) -> Result<DriverSet<MockBluetooth, MockPowerLocks, MockPushButton>> {
        Ok(self.drivers)
    }
}

/// How the Uno build reaches its Bluetooth module.
#[derive(Debug)]
pub enum BluetoothLink {
    /// Host terminal.
    Console,

    /// Host serial device.
    Serial {
        port: String,
        baud_rate: u32,
        max_line_length: usize,
    },

    /// Injected mock link.
    Mock(MockBluetooth),
}

type GpioLocks = PulsePowerLocks<SimulatedOutputPin>;
type GpioButton = GpioPushButton<SimulatedInputPin>;

fn gpio_outputs(gpio: &SimulatedGpio, pins: &PinAssignment, pulse: Duration) -> Result<GpioLocks> {
    PulsePowerLocks::new(
        gpio.output(pins.lock_output)?,
        gpio.output(pins.unlock_output)?,
        pulse,
    )
}

fn gpio_buttons(gpio: &SimulatedGpio, pins: &PinAssignment) -> Result<(GpioButton, GpioButton)> {
    Ok((
        GpioPushButton::active_low("Lock button", gpio.input_pullup(pins.lock_button)?),
        GpioPushButton::active_low("Unlock button", gpio.input_pullup(pins.unlock_button)?),
    ))
}

/// Arduino Uno build with a Bluetooth serial module, on a simulated GPIO bank.
#[derive(Debug)]
pub struct SimulatedUnoFactory {
    gpio: SimulatedGpio,
    pins: PinAssignment,
    link: BluetoothLink,
    pulse: Duration,
}

impl SimulatedUnoFactory {
    /// Factory with the board's default wiring and pulse length.
    pub fn new(gpio: SimulatedGpio, link: BluetoothLink) -> Self {
        Self {
            gpio,
            pins: UNO_PINS,
            link,
            pulse: Duration::from_millis(DEFAULT_PULSE_DURATION_MS),
        }
    }

    /// Override the wiring.
    pub fn with_pins(mut self, pins: PinAssignment) -> Self {
        self.pins = pins;
        self
    }

    /// Override the actuator pulse length.
    pub fn with_pulse_duration(mut self, pulse: Duration) -> Self {
        self.pulse = pulse;
        self
    }

    fn open_link(link: BluetoothLink) -> Result<AnyBluetoothDriver> {
        match link {
            BluetoothLink::Console => Ok(AnyBluetoothDriver::Console(
                crate::console::ConsoleBluetooth::spawn()?,
            )),
            BluetoothLink::Mock(mock) => Ok(AnyBluetoothDriver::Mock(mock)),
            #[cfg(feature = "hardware-serial")]
            BluetoothLink::Serial {
                port,
                baud_rate,
                max_line_length,
            } => Ok(AnyBluetoothDriver::Serial(crate::serial::SerialBluetooth::open(
                &port,
                baud_rate,
                max_line_length,
            )?)),
            #[cfg(not(feature = "hardware-serial"))]
            BluetoothLink::Serial { port, .. } => Err(HardwareError::unsupported(format!(
                "serial link {port} requires the hardware-serial feature"
            ))),
        }
    }
}

impl DriverFactory for SimulatedUnoFactory {
    type Link = AnyBluetoothDriver;
    type PowerLocks = GpioLocks;
    type Button = GpioButton;

    fn build(self) -> Result<DriverSet<AnyBluetoothDriver, GpioLocks, GpioButton>> {
        self.pins.validate()?;
        if !matches!(self.pins.link, LinkPins::Serial { .. }) {
            return Err(HardwareError::configuration(
                "Uno build needs serial link pins",
            ));
        }

        let power_locks = gpio_outputs(&self.gpio, &self.pins, self.pulse)?;
        let (lock_button, unlock_button) = gpio_buttons(&self.gpio, &self.pins)?;
        let link = Self::open_link(self.link)?;

        info!(link = %link.info(), "Uno drivers ready");
        Ok(DriverSet::new(link, power_locks, lock_button, unlock_button))
    }
}

/// ATtiny84 build with a Linx RF receiver, on a simulated GPIO bank.
#[derive(Debug)]
pub struct SimulatedLinxFactory {
    gpio: SimulatedGpio,
    pins: PinAssignment,
    pulse: Duration,
}

impl SimulatedLinxFactory {
    /// Factory with the board's default wiring and pulse length.
    pub fn new(gpio: SimulatedGpio) -> Self {
        Self {
            gpio,
            pins: ATTINY84_LINX_PINS,
            pulse: Duration::from_millis(DEFAULT_PULSE_DURATION_MS),
        }
    }

    /// Override the wiring.
    pub fn with_pins(mut self, pins: PinAssignment) -> Self {
        self.pins = pins;
        self
    }

    /// Override the actuator pulse length.
    pub fn with_pulse_duration(mut self, pulse: Duration) -> Self {
        self.pulse = pulse;
        self
    }
}

impl DriverFactory for SimulatedLinxFactory {
    type Link = GpioRfReceiver<SimulatedInputPin>;
    type PowerLocks = GpioLocks;
    type Button = GpioButton;

    fn build(self) -> Result<DriverSet<Self::Link, GpioLocks, GpioButton>> {
        self.pins.validate()?;
        let LinkPins::LinxReceiver {
            lock_data,
            unlock_data,
        } = self.pins.link
        else {
            return Err(HardwareError::configuration(
                "Linx build needs receiver data pins",
            ));
        };

        let receiver = GpioRfReceiver::new(self.gpio.input(lock_data)?, self.gpio.input(unlock_data)?);
        let power_locks = gpio_outputs(&self.gpio, &self.pins, self.pulse)?;
        let (lock_button, unlock_button) = gpio_buttons(&self.gpio, &self.pins)?;

        info!(receiver = %receiver.info(), "Linx drivers ready");
        Ok(DriverSet::new(receiver, power_locks, lock_button, unlock_button))
    }
}
