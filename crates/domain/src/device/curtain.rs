//! Curtain — travels one step per tick toward the end its status names.
//!
//! `position` is the closure percentage: 100 is fully closed, 0 fully open.

use rand::Rng;
use serde_json::{Value, json};

use super::{DeviceBehaviour, unknown_parameter};
use crate::bounds::Bounds;
use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{Parameters, TickOutcome, read_bounded};
use crate::status::CurtainStatus;

pub const POSITION: Bounds = Bounds::new("position", 0, 100);
pub const POSITION_RATE: i64 = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Curtain {
    status: CurtainStatus,
    position: i64,
}

impl Default for Curtain {
    fn default() -> Self {
        Self {
            status: CurtainStatus::Closed,
            position: POSITION.max,
        }
    }
}

impl Curtain {
    #[must_use]
    pub fn position(&self) -> i64 {
        self.position
    }
}

impl DeviceBehaviour for Curtain {
    const DEVICE_TYPE: DeviceType = DeviceType::Curtain;
    const PARAMETERS: &'static [&'static str] = &["position"];
    const CONSTRUCTION_PARAMETERS: &'static [&'static str] = Self::PARAMETERS;

    fn status(&self) -> &'static str {
        self.status.as_str()
    }

    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError> {
        self.status = CurtainStatus::from_value(value)?;
        Ok(())
    }

    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError> {
        match field {
            "position" => self.position = read_bounded(POSITION, value)?,
            other => return Err(unknown_parameter(Self::DEVICE_TYPE, other)),
        }
        Ok(())
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let mut outcome = TickOutcome::default();
        let delta = match self.status {
            CurtainStatus::Open => -POSITION_RATE,
            CurtainStatus::Closed => POSITION_RATE,
        };
        let next = POSITION.step(self.position, delta);
        if next != self.position {
            self.position = next;
            outcome.record_action("position", next);
        }
        if ctx.drift_fires() {
            self.status = self.status.toggled();
            outcome.record_update("status", self.status.as_str());
        }
        outcome
    }

    fn parameters(&self) -> Parameters {
        let value = json!({ "position": self.position });
        value.as_object().cloned().unwrap_or_default()
    }
}
