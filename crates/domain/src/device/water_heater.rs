//! Water heater — heats toward a target, cools toward ambient, and can
//! switch itself on and off on a daily schedule.

use rand::Rng;
use serde_json::{Value, json};

use super::{DeviceBehaviour, unknown_parameter};
use crate::bounds::Bounds;
use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{Parameters, TickOutcome, read_bool, read_bounded, read_int, read_str};
use crate::status::Power;
use crate::time::{TimeOfDay, Timestamp};

/// Celsius.
pub const TARGET_TEMPERATURE: Bounds = Bounds::new("target_temperature", 49, 60);
pub const AMBIENT_TEMPERATURE: i64 = 23;
pub const HEATING_RATE: i64 = 1;

/// Half-width of the window around a scheduled time in which the timer fires.
pub const SCHEDULE_WINDOW_SECS: i64 = 5;

const SCHEDULE_RANGE: Bounds = Bounds::new("schedule", 0, TimeOfDay::MINUTES_PER_DAY - 1);

const DRIFT_FIELDS: &[&str] = &[
    "status",
    "target_temperature",
    "timer_enabled",
    "scheduled_on",
    "scheduled_off",
];

#[derive(Debug, Clone, PartialEq)]
pub struct WaterHeater {
    status: Power,
    temperature: i64,
    target_temperature: i64,
    is_heating: bool,
    timer_enabled: bool,
    scheduled_on: TimeOfDay,
    scheduled_off: TimeOfDay,
}

impl Default for WaterHeater {
    fn default() -> Self {
        Self {
            status: Power::Off,
            temperature: AMBIENT_TEMPERATURE,
            target_temperature: TARGET_TEMPERATURE.min,
            is_heating: false,
            timer_enabled: false,
            scheduled_on: TimeOfDay::from_hm(6, 30).unwrap_or_default(),
            scheduled_off: TimeOfDay::from_hm(8, 0).unwrap_or_default(),
        }
    }
}

impl WaterHeater {
    #[must_use]
    pub fn temperature(&self) -> i64 {
        self.temperature
    }

    #[must_use]
    pub fn target_temperature(&self) -> i64 {
        self.target_temperature
    }

    #[must_use]
    pub fn is_heating(&self) -> bool {
        self.is_heating
    }

    #[must_use]
    pub fn timer_enabled(&self) -> bool {
        self.timer_enabled
    }

    #[must_use]
    pub fn scheduled_on(&self) -> TimeOfDay {
        self.scheduled_on
    }

    #[must_use]
    pub fn scheduled_off(&self) -> TimeOfDay {
        self.scheduled_off
    }

    fn run_timer(&mut self, now: Timestamp, outcome: &mut TickOutcome) {
        if !self.timer_enabled {
            return;
        }
        let due = |at: TimeOfDay| (at.on_same_day(now) - now).num_seconds().abs() <= SCHEDULE_WINDOW_SECS;
        let next = match self.status {
            Power::Off if due(self.scheduled_on) => Power::On,
            Power::On if due(self.scheduled_off) => Power::Off,
            _ => return,
        };
        self.status = next;
        outcome.record_update("status", next.as_str());
    }

    fn regulate(&mut self, outcome: &mut TickOutcome) {
        let heating = self.status == Power::On && self.temperature < self.target_temperature;
        if heating != self.is_heating {
            self.is_heating = heating;
            outcome.record_action("is_heating", heating);
        }
        if self.is_heating {
            self.temperature += HEATING_RATE;
            outcome.record_action("temperature", self.temperature);
        } else if self.temperature > AMBIENT_TEMPERATURE {
            self.temperature -= HEATING_RATE;
            outcome.record_action("temperature", self.temperature);
        }
    }

    fn drift<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>, outcome: &mut TickOutcome) {
        match ctx.choose_field(DRIFT_FIELDS) {
            "target_temperature" => {
                self.target_temperature = ctx.other_in(TARGET_TEMPERATURE, self.target_temperature);
                outcome.record_action("target_temperature", self.target_temperature);
            }
            "timer_enabled" => {
                self.timer_enabled = !self.timer_enabled;
                outcome.record_action("timer_enabled", self.timer_enabled);
            }
            "scheduled_on" => {
                self.scheduled_on = other_time(ctx, self.scheduled_on);
                outcome.record_action("scheduled_on", self.scheduled_on.to_string());
            }
            "scheduled_off" => {
                self.scheduled_off = other_time(ctx, self.scheduled_off);
                outcome.record_action("scheduled_off", self.scheduled_off.to_string());
            }
            _ => {
                self.status = self.status.toggled();
                outcome.record_update("status", self.status.as_str());
            }
        }
    }
}

fn other_time<R: Rng>(ctx: &mut TickContext<'_, R>, current: TimeOfDay) -> TimeOfDay {
    let minutes = ctx.other_in(SCHEDULE_RANGE, current.minutes());
    TimeOfDay::from_minutes(minutes).unwrap_or(current)
}

fn read_time(field: &'static str, value: &Value) -> Result<TimeOfDay, ValidationError> {
    read_str(field, value)?.parse()
}

impl DeviceBehaviour for WaterHeater {
    const DEVICE_TYPE: DeviceType = DeviceType::WaterHeater;
    const PARAMETERS: &'static [&'static str] = &[
        "target_temperature",
        "timer_enabled",
        "scheduled_on",
        "scheduled_off",
    ];
    const CONSTRUCTION_PARAMETERS: &'static [&'static str] = &[
        "temperature",
        "target_temperature",
        "is_heating",
        "timer_enabled",
        "scheduled_on",
        "scheduled_off",
    ];

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError> {
        self.status = Power::from_value(value)?;
        Ok(())
    }

    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match field {
            // Derived fields, only reachable through construction.
            "temperature" => self.temperature = read_int("temperature", value)?,
            "is_heating" => self.is_heating = read_bool("is_heating", value)?,
            "target_temperature" => self.target_temperature = read_bounded(TARGET_TEMPERATURE, value)?,
            "timer_enabled" => self.timer_enabled = read_bool("timer_enabled", value)?,
            "scheduled_on" => self.scheduled_on = read_time("scheduled_on", value)?,
            "scheduled_off" => self.scheduled_off = read_time("scheduled_off", value)?,
            other => return Err(unknown_parameter(Self::DEVICE_TYPE, other)),
        }
        Ok(())
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        self.run_timer(ctx.now(), &mut outcome);
        self.regulate(&mut outcome);
        if ctx.drift_fires() {
            self.drift(ctx, &mut outcome);
        }
        outcome
    }

    fn parameters(&self) -> Parameters {
        let value = json!({
            "temperature": self.temperature,
            "target_temperature": self.target_temperature,
            "is_heating": self.is_heating,
            "timer_enabled": self.timer_enabled,
            "scheduled_on": self.scheduled_on.to_string(),
            "scheduled_off": self.scheduled_off.to_string(),
        });
        value.as_object().cloned().unwrap_or_default()
    }
}
