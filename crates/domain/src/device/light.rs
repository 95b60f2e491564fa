//! Light — optionally dimmable, optionally colour-changing.

use rand::Rng;
use serde_json::{Value, json};

use super::{DeviceBehaviour, unknown_parameter};
use crate::bounds::Bounds;
use crate::color::{Color, MAX_RGB};
use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{Parameters, TickOutcome, read_bool, read_bounded, read_str};
use crate::status::Power;

pub const BRIGHTNESS: Bounds = Bounds::new("brightness", 0, 100);
pub const DEFAULT_BRIGHTNESS: i64 = 80;

const COLOR_RANGE: Bounds = Bounds::new("color", 0, MAX_RGB);

#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    status: Power,
    is_dimmable: bool,
    brightness: i64,
    dynamic_color: bool,
    color: Color,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            status: Power::Off,
            is_dimmable: false,
            brightness: DEFAULT_BRIGHTNESS,
            dynamic_color: false,
            color: Color::default(),
        }
    }
}

impl Light {
    #[must_use]
    pub fn is_dimmable(&self) -> bool {
        self.is_dimmable
    }

    #[must_use]
    pub fn brightness(&self) -> i64 {
        self.brightness
    }

    #[must_use]
    pub fn dynamic_color(&self) -> bool {
        self.dynamic_color
    }

    #[must_use]
    pub fn color(&self) -> &Color {
        &self.color
    }

    fn drift_fields(&self) -> Vec<&'static str> {
        let mut fields = vec!["status"];
        if self.is_dimmable {
            fields.push("brightness");
        }
        if self.dynamic_color {
            fields.push("color");
        }
        fields
    }
}

impl DeviceBehaviour for Light {
    const DEVICE_TYPE: DeviceType = DeviceType::Light;
    const PARAMETERS: &'static [&'static str] =
        &["brightness", "color", "is_dimmable", "dynamic_color"];
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
            "brightness" => self.brightness = read_bounded(BRIGHTNESS, value)?,
            "color" => self.color = read_str("color", value)?.parse()?,
            "is_dimmable" => self.is_dimmable = read_bool("is_dimmable", value)?,
            "dynamic_color" => self.dynamic_color = read_bool("dynamic_color", value)?,
            other => return Err(unknown_parameter(Self::DEVICE_TYPE, other)),
        }
        Ok(())
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        if !ctx.drift_fires() {
            return outcome;
        }
        match ctx.choose_field(&self.drift_fields()) {
            "brightness" => {
                self.brightness = ctx.other_in(BRIGHTNESS, self.brightness);
                outcome.record_action("brightness", self.brightness);
            }
            "color" => {
                let next = ctx.other_in(COLOR_RANGE, i64::from(self.color.rgb()));
                self.color = Color::from_rgb(u32::try_from(next).unwrap_or_default());
                outcome.record_action("color", self.color.as_str());
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
            "is_dimmable": self.is_dimmable,
            "brightness": self.brightness,
            "dynamic_color": self.dynamic_color,
            "color": self.color.as_str(),
        });
        value.as_object().cloned().unwrap_or_default()
    }
}
