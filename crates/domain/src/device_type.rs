//! Device type — the closed set of simulated device kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Kind of simulated device. Decides the status vocabulary and the
/// attribute set a device carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    WaterHeater,
    Light,
    AirConditioner,
    DoorLock,
    Curtain,
}

impl DeviceType {
    /// Every device type.
    pub const ALL: [Self; 5] = [
        Self::WaterHeater,
        Self::Light,
        Self::AirConditioner,
        Self::DoorLock,
        Self::Curtain,
    ];

    /// Wire name of the type (`water_heater`, `door_lock`, …).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WaterHeater => "water_heater",
            Self::Light => "light",
            Self::AirConditioner => "air_conditioner",
            Self::DoorLock => "door_lock",
            Self::Curtain => "curtain",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownType(s.to_string()))
    }
}
