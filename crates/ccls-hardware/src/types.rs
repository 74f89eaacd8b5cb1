//! Common types shared across driver implementations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Generic device information.
///
/// Contains metadata about a driver such as name, model and the pins it
/// is wired to, used for startup logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Device name (e.g., "HC-05", "Mock Bluetooth").
    pub name: String,

    /// Device model identifier.
    pub model: String,

    /// Optional human readable wiring, e.g. "D4/D5".
    pub wiring: Option<String>,
}

impl DeviceInfo {
    /// Create a new DeviceInfo with required fields.
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
            wiring: None,
        }
    }

    /// Set the wiring description.
    pub fn with_wiring(mut self, wiring: impl Into<String>) -> Self {
        self.wiring = Some(wiring.into());
        self
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.wiring {
            Some(wiring) => write!(f, "{} ({}) on {}", self.name, self.model, wiring),
            None => write!(f, "{} ({})", self.name, self.model),
        }
    }
}

/// Direction of an actuator pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PulseKind {
    Lock,
    Unlock,
}

impl fmt::Display for PulseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock => write!(f, "lock"),
            Self::Unlock => write!(f, "unlock"),
        }
    }
}

/// An actuator pulse observed by a test double.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRecord {
    /// Which actuator was pulsed.
    pub kind: PulseKind,

    /// When the pulse was issued.
    pub at: DateTime<Utc>,
}

impl PulseRecord {
    /// Record a pulse issued now.
    pub fn now(kind: PulseKind) -> Self {
        Self {
            kind,
            at: Utc::now(),
        }
    }
}
