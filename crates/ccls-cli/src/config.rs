//! Controller configuration file.
//!
//! Every field has a default, so an empty file (or none at all) runs the
//! Uno build on a console link.
//!
//! ```toml
//! target = "uno_bluetooth"
//! tick_interval_ms = 20
//! pulse_duration_ms = 250
//! max_line_length = 64
//! log_level = "info"
//!
//! [credentials]
//! username = "alice"
//! password = "secret"
//!
//! [link]
//! mode = "serial"
//! port = "/dev/rfcomm0"
//! baud_rate = 9600
//! ```

use ccls_controller::SessionConfig;
use ccls_core::{
    Credentials, HardwareTarget, LinkPins, PinAssignment,
    constants::{
        DEFAULT_BAUD_RATE, DEFAULT_MAX_LINE_LENGTH, DEFAULT_PULSE_DURATION_MS,
        DEFAULT_TICK_INTERVAL_MS, MAX_PULSE_DURATION_MS,
    },
};
use ccls_hardware::BluetoothLink;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] ccls_core::Error),
}

/// How the Bluetooth module is reached on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkMode {
    /// Standard input and output.
    #[default]
    Console,

    /// A serial device, e.g. `/dev/rfcomm0`.
    Serial,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    pub mode: LinkMode,
    pub port: Option<String>,
    pub baud_rate: u32,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mode: LinkMode::Console,
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    pub target: HardwareTarget,
    /// `None` falls back to the built-in credentials.
    pub credentials: Option<Credentials>,
    pub link: LinkConfig,
    pub tick_interval_ms: u64,
    pub pulse_duration_ms: u64,
    pub max_line_length: usize,
    pub log_level: String,
    /// Overrides the board's default wiring.
    pub pins: Option<PinAssignment>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            target: HardwareTarget::UnoBluetooth,
            credentials: None,
            link: LinkConfig::default(),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            pulse_duration_ms: DEFAULT_PULSE_DURATION_MS,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            log_level: "info".to_string(),
            pins: None,
        }
    }
}

impl ControllerConfig {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ControllerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(invalid("tick_interval_ms must be greater than zero"));
        }
        if self.pulse_duration_ms > MAX_PULSE_DURATION_MS {
            return Err(invalid(format!(
                "pulse_duration_ms must be at most {MAX_PULSE_DURATION_MS}"
            )));
        }
        if self.link.mode == LinkMode::Serial && self.link.port.is_none() {
            return Err(invalid("link.port is required in serial mode"));
        }

        let pins = self.pins();
        pins.validate()?;
        match (self.target, pins.link) {
            (HardwareTarget::UnoBluetooth, LinkPins::Serial { .. })
            | (HardwareTarget::Attiny84Linx, LinkPins::LinxReceiver { .. }) => {}
            (target, _) => {
                return Err(invalid(format!("pins.link does not match target {target}")));
            }
        }

        if self.target == HardwareTarget::UnoBluetooth {
            self.session_config()?;
        }
        Ok(())
    }

    /// Whether the built-in credentials are in effect.
    pub fn uses_default_credentials(&self) -> bool {
        self.credentials.is_none()
    }

    pub fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        let credentials = self.credentials.clone().unwrap_or_default();
        Ok(SessionConfig::new(credentials, self.max_line_length)?)
    }

    pub fn pins(&self) -> PinAssignment {
        self.pins.unwrap_or_else(|| self.target.default_pins())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn pulse_duration(&self) -> Duration {
        Duration::from_millis(self.pulse_duration_ms)
    }

    /// Link description for the Uno driver factory.
    pub fn bluetooth_link(&self) -> BluetoothLink {
        match (&self.link.mode, &self.link.port) {
            (LinkMode::Serial, Some(port)) => BluetoothLink::Serial {
                port: port.clone(),
                baud_rate: self.link.baud_rate,
                max_line_length: self.max_line_length,
            },
            _ => BluetoothLink::Console,
        }
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid(ccls_core::Error::Config(message.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccls_core::PinNumber;
    use rstest::rstest;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: ControllerConfig = toml::from_str("").unwrap();

        assert_eq!(config.target, HardwareTarget::UnoBluetooth);
        assert_eq!(config.link.mode, LinkMode::Console);
        assert_eq!(config.tick_interval(), Duration::from_millis(20));
        assert!(config.uses_default_credentials());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_file() {
        let config: ControllerConfig = toml::from_str(
            r#"
            target = "uno_bluetooth"
            tick_interval_ms = 10
            pulse_duration_ms = 500
            max_line_length = 32
            log_level = "debug"

            [credentials]
            username = "alice"
            password = "secret"

            [link]
            mode = "serial"
            port = "/dev/rfcomm0"
            baud_rate = 38400
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert!(!config.uses_default_credentials());
        assert!(
            config
                .session_config()
                .unwrap()
                .credentials()
                .verify_password("secret")
        );
        assert!(matches!(
            config.bluetooth_link(),
            BluetoothLink::Serial { baud_rate: 38400, max_line_length: 32, .. }
        ));
    }

    #[test]
    fn test_linx_target_with_pin_override() {
        let config: ControllerConfig = toml::from_str(
            r#"
            target = "attiny84_linx"

            [pins]
            lock_output = 7
            unlock_output = 8
            lock_button = 9
            unlock_button = 10

            [pins.link]
            kind = "linx_receiver"
            lock_data = 0
            unlock_data = 1
            "#,
        )
        .unwrap();

        config.validate().unwrap();
        assert_eq!(config.pins().lock_output, PinNumber::new(7));
    }

    #[rstest]
    #[case("tick_interval_ms = 0")]
    #[case("pulse_duration_ms = 5000")]
    #[case("max_line_length = 0")]
    #[case("[link]\nmode = \"serial\"")]
    #[case("target = \"attiny84_linx\"\n[pins]\nlock_output = 4\nunlock_output = 5\nlock_button = 6\nunlock_button = 7\n[pins.link]\nkind = \"serial\"\ntx = 2\nrx = 3")]
    #[case("[pins]\nlock_output = 4\nunlock_output = 4\nlock_button = 6\nunlock_button = 7\n[pins.link]\nkind = \"serial\"\ntx = 2\nrx = 3")]
    fn test_invalid_config(#[case] content: &str) {
        let config: ControllerConfig = toml::from_str(content).unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[rstest]
    #[case("[credentials]\nusername = \"\"\npassword = \"x\"")]
    #[case("unknown_field = 1")]
    #[case("target = \"esp32\"")]
    fn test_rejected_at_parse(#[case] content: &str) {
        assert!(toml::from_str::<ControllerConfig>(content).is_err());
    }
}
