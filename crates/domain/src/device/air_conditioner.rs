//! Air conditioner — target temperature plus mode, fan and swing settings.

use rand::Rng;
use serde_json::{Value, json};

use super::{DeviceBehaviour, unknown_parameter};
use crate::bounds::Bounds;
use crate::choice::define_choice;
use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{Parameters, TickOutcome, read_bounded};
use crate::status::Power;

/// Celsius.
pub const TEMPERATURE: Bounds = Bounds::new("temperature", 16, 30);
pub const DEFAULT_TEMPERATURE: i64 = 24;

const DRIFT_FIELDS: &[&str] = &["status", "temperature", "mode", "fan_speed", "swing"];

define_choice!(
    /// Operating mode.
    Mode("mode") {
        #[default]
        Cool => "cool",
        Heat => "heat",
        Fan => "fan",
    }
);

define_choice!(
    /// Fan speed.
    FanSpeed("fan_speed") {
        #[default]
        Medium => "medium",
        Off => "off",
        Low => "low",
        High => "high",
    }
);

define_choice!(
    /// Louvre swing setting.
    Swing("swing") {
        #[default]
        Off => "off",
        On => "on",
        Auto => "auto",
    }
);

#[derive(Debug, Clone, PartialEq)]
pub struct AirConditioner {
    status: Power,
    temperature: i64,
    mode: Mode,
    fan_speed: FanSpeed,
    swing: Swing,
}

impl Default for AirConditioner {
    fn default() -> Self {
        Self {
            status: Power::Off,
            temperature: DEFAULT_TEMPERATURE,
            mode: Mode::default(),
            fan_speed: FanSpeed::default(),
            swing: Swing::default(),
        }
    }
}

impl AirConditioner {
    #[must_use]
    pub fn temperature(&self) -> i64 {
        self.temperature
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn fan_speed(&self) -> FanSpeed {
        self.fan_speed
    }

    #[must_use]
    pub fn swing(&self) -> Swing {
        self.swing
    }
}

impl DeviceBehaviour for AirConditioner {
    const DEVICE_TYPE: DeviceType = DeviceType::AirConditioner;
    const PARAMETERS: &'static [&'static str] = &["temperature", "mode", "fan_speed", "swing"];
    const CONSTRUCTION_PARAMETERS: &'static [&'static str] = Self::PARAMETERS;

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError> {
        self.status = Power::from_value(value)?;
        Ok(())
    }

    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match field {
            "temperature" => self.temperature = read_bounded(TEMPERATURE, value)?,
            "mode" => self.mode = Mode::from_value(value)?,
            "fan_speed" => self.fan_speed = FanSpeed::from_value(value)?,
            "swing" => self.swing = Swing::from_value(value)?,
            other => return Err(unknown_parameter(Self::DEVICE_TYPE, other)),
        }
        Ok(())
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !ctx.drift_fires() {
            return outcome;
        }
        match ctx.choose_field(DRIFT_FIELDS) {
            "temperature" => {
                self.temperature = ctx.other_in(TEMPERATURE, self.temperature);
                outcome.record_action("temperature", self.temperature);
            }
            "mode" => {
                self.mode = ctx.other_choice(Mode::ALL, self.mode);
                outcome.record_action("mode", self.mode.as_str());
            }
            "fan_speed" => {
                self.fan_speed = ctx.other_choice(FanSpeed::ALL, self.fan_speed);
                outcome.record_action("fan_speed", self.fan_speed.as_str());
            }
            "swing" => {
                self.swing = ctx.other_choice(Swing::ALL, self.swing);
                outcome.record_action("swing", self.swing.as_str());
            }
            _ => {
                self.status = self.status.toggled();
                outcome.record_update("status", self.status.as_str());
            }
        }
        outcome
    }

    fn parameters(&self) -> Parameters {
        let value = json!({
            "temperature": self.temperature,
            "mode": self.mode.as_str(),
            "fan_speed": self.fan_speed.as_str(),
            "swing": self.swing.as_str(),
        });
        value.as_object().cloned().unwrap_or_default()
    }
}
