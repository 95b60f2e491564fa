//! Door lock — a battery that drains each tick and recharges when empty.

use rand::Rng;
use serde_json::{Value, json};

use super::{DeviceBehaviour, unknown_parameter};
use crate::bounds::Bounds;
use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{Parameters, TickOutcome, read_bool, read_bounded};
use crate::status::LockStatus;

pub const BATTERY: Bounds = Bounds::new("battery_level", 0, 100);
pub const BATTERY_DRAIN: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct DoorLock {
    status: LockStatus,
    auto_lock_enabled: bool,
    battery_level: i64,
}

impl Default for DoorLock {
    fn default() -> Self {
        Self {
            status: LockStatus::Unlocked,
            auto_lock_enabled: false,
            battery_level: BATTERY.max,
        }
    }
}

impl DoorLock {
    #[must_use]
    pub fn auto_lock_enabled(&self) -> bool {
        self.auto_lock_enabled
    }

    #[must_use]
    pub fn battery_level(&self) -> i64 {
        self.battery_level
    }
}

impl DeviceBehaviour for DoorLock {
    const DEVICE_TYPE: DeviceType = DeviceType::DoorLock;
    const PARAMETERS: &'static [&'static str] = &["auto_lock_enabled", "battery_level"];
    const CONSTRUCTION_PARAMETERS: &'static [&'static str] = Self::PARAMETERS;

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError> {
        self.status = LockStatus::from_value(value)?;
        Ok(())
    }

    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match field {
            "auto_lock_enabled" => self.auto_lock_enabled = read_bool("auto_lock_enabled", value)?,
            "battery_level" => self.battery_level = read_bounded(BATTERY, value)?,
            other => return Err(unknown_parameter(Self::DEVICE_TYPE, other)),
        }
        Ok(())
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        // An empty battery wraps to full instead of blocking the lock.
        self.battery_level = if self.battery_level <= BATTERY.min {
            BATTERY.max
        } else {
            self.battery_level - BATTERY_DRAIN
        };
        outcome.record_action("battery_level", self.battery_level);
        if ctx.drift_fires() {
            self.status = self.status.toggled();
            outcome.record_update("status", self.status.as_str());
        }
        outcome
    }

    fn parameters(&self) -> Parameters {
        let value = json!({
            "auto_lock_enabled": self.auto_lock_enabled,
            "battery_level": self.battery_level,
        });
        value.as_object().cloned().unwrap_or_default()
    }
}
