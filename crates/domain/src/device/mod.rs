//! Device — a simulated smart-home appliance with validated state.
//!
//! [`Device`] holds the attributes every appliance shares (id, room, name)
//! and a [`DeviceKind`] with the type-specific state machine. Each kind
//! implements [`DeviceBehaviour`]; dispatch is a closed `match` on the
//! kind, never open-ended extension.

mod air_conditioner;
mod curtain;
mod door_lock;
mod light;
mod water_heater;

pub use air_conditioner::{AirConditioner, FanSpeed, Mode, Swing};
pub use curtain::Curtain;
pub use door_lock::DoorLock;
pub use light::Light;
pub use water_heater::WaterHeater;

use rand::Rng;
use serde_json::{Value, json};

use crate::device_type::DeviceType;
use crate::drift::TickContext;
use crate::error::ValidationError;
use crate::params::{self, ApplyReport, GENERAL_PARAMETERS, Parameters, TickOutcome};
use crate::spec::DeviceSpec;

/// Per-type state machine contract.
///
/// Construction goes through the same setters as runtime updates, so a
/// value rejected by [`set`](Self::set) is also rejected by
/// [`build`](Self::build).
pub trait DeviceBehaviour: Default {
    const DEVICE_TYPE: DeviceType;

    /// Type-specific fields accepted by [`Device::apply`].
    const PARAMETERS: &'static [&'static str];

    /// Type-specific fields accepted when the device is created.
    const CONSTRUCTION_PARAMETERS: &'static [&'static str];

    /// Current status, always one of the type's two valid values.
    fn status(&self) -> &'static str;

    /// Validate and assign the status.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value is not one of the two
    /// statuses of this type; the status is left unchanged.
    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError>;

    /// Validate and assign one type-specific field.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed or out-of-domain values,
    /// and for fields outside [`CONSTRUCTION_PARAMETERS`](Self::CONSTRUCTION_PARAMETERS).
    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError>;

    /// Advance one tick: physical rules first, drift afterwards.
    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome;

    /// Snapshot of every type-specific field.
    fn parameters(&self) -> Parameters;

    /// Build from an optional status and a parameter map, falling back to
    /// defaults for anything absent. Unrelated keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised by a setter.
    fn build(status: Option<&Value>, parameters: &Parameters) -> Result<Self, ValidationError> {
        let mut device = Self::default();
        if let Some(status) = status {
            device.set_status(status)?;
        }
        for field in Self::CONSTRUCTION_PARAMETERS {
            if let Some(value) = parameters.get(*field) {
                device.set(field, value)?;
            }
        }
        Ok(device)
    }
}

fn unknown_parameter(device_type: DeviceType, field: &str) -> ValidationError {
    ValidationError::UnknownParameter {
        field: field.to_string(),
        device_type,
    }
}

/// Type-specific state of a device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceKind {
    WaterHeater(WaterHeater),
    Light(Light),
    AirConditioner(AirConditioner),
    DoorLock(DoorLock),
    Curtain(Curtain),
}

macro_rules! dispatch {
    ($kind:expr, $device:ident => $body:expr) => {
        match $kind {
            DeviceKind::WaterHeater($device) => $body,
            DeviceKind::Light($device) => $body,
            DeviceKind::AirConditioner($device) => $body,
            DeviceKind::DoorLock($device) => $body,
            DeviceKind::Curtain($device) => $body,
        }
    };
}

macro_rules! dispatch_type {
    ($kind:expr, $ty:ident => $body:expr) => {
        match $kind {
            DeviceKind::WaterHeater(_) => {
                type $ty = WaterHeater;
                $body
            }
            DeviceKind::Light(_) => {
                type $ty = Light;
                $body
            }
            DeviceKind::AirConditioner(_) => {
                type $ty = AirConditioner;
                $body
            }
            DeviceKind::DoorLock(_) => {
                type $ty = DoorLock;
                $body
            }
            DeviceKind::Curtain(_) => {
                type $ty = Curtain;
                $body
            }
        }
    };
}

impl DeviceKind {
    /// Build the kind for `device_type` from a status and parameter map.
    ///
    /// # Errors
    ///
    /// Returns the first validation error raised by a setter.
    pub fn build(
        device_type: DeviceType,
        status: Option<&Value>,
        parameters: &Parameters,
    ) -> Result<Self, ValidationError> {
        Ok(match device_type {
            DeviceType::WaterHeater => Self::WaterHeater(WaterHeater::build(status, parameters)?),
            DeviceType::Light => Self::Light(Light::build(status, parameters)?),
            DeviceType::AirConditioner => {
                Self::AirConditioner(AirConditioner::build(status, parameters)?)
            }
            DeviceType::DoorLock => Self::DoorLock(DoorLock::build(status, parameters)?),
            DeviceType::Curtain => Self::Curtain(Curtain::build(status, parameters)?),
        })
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        dispatch_type!(self, T => T::DEVICE_TYPE)
    }

    /// Type-specific fields accepted by [`Device::apply`].
    #[must_use]
    pub fn parameter_names(&self) -> &'static [&'static str] {
        dispatch_type!(self, T => T::PARAMETERS)
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        dispatch!(self, d => d.status())
    }

    fn set_status(&mut self, value: &Value) -> Result<(), ValidationError> {
        dispatch!(self, d => d.set_status(value))
    }

    fn set(&mut self, field: &str, value: &Value) -> Result<(), ValidationError> {
        if !self.parameter_names().contains(&field) {
            return Err(unknown_parameter(self.device_type(), field));
        }
        dispatch!(self, d => d.set(field, value))
    }

    fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        dispatch!(self, d => d.tick(ctx))
    }

    #[must_use]
    pub fn parameters(&self) -> Parameters {
        dispatch!(self, d => d.parameters())
    }
}

/// A live simulated device.
#[derive(Debug, Clone, PartialEq)]
pub struct Device {
    id: String,
    room: String,
    name: String,
    kind: DeviceKind,
}

impl Device {
    /// Create a device from a validated creation request.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the status or any type-specific
    /// parameter is malformed or out of its domain.
    pub fn from_spec(spec: &DeviceSpec) -> Result<Self, ValidationError> {
        let kind = DeviceKind::build(spec.device_type, spec.status.as_ref(), &spec.parameters)?;
        Ok(Self {
            id: spec.id.clone(),
            room: spec.room.clone(),
            name: spec.name.clone(),
            kind,
        })
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn room(&self) -> &str {
        &self.room
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn device_type(&self) -> DeviceType {
        self.kind.device_type()
    }

    #[must_use]
    pub fn status(&self) -> &'static str {
        self.kind.status()
    }

    #[must_use]
    pub fn kind(&self) -> &DeviceKind {
        &self.kind
    }

    /// Whether [`apply`](Self::apply) accepts `field` for this device.
    #[must_use]
    pub fn accepts(&self, field: &str) -> bool {
        GENERAL_PARAMETERS.contains(&field) || self.kind.parameter_names().contains(&field)
    }

    /// Advance one tick and report what changed.
    pub fn tick<R: Rng>(&mut self, ctx: &mut TickContext<'_, R>) -> TickOutcome {
        let outcome = self.kind.tick(ctx);
        if !outcome.is_empty() {
            tracing::trace!(
                device_id = %self.id,
                action = ?outcome.action,
                update = ?outcome.update,
                "device ticked"
            );
        }
        outcome
    }

    /// Validate and assign every field of `parameters`.
    ///
    /// Each field is handled independently: a malformed or out-of-domain
    /// value is logged and reported in [`ApplyReport::rejected`] while the
    /// remaining fields still apply. Applying the same map twice leaves the
    /// device in the same state as applying it once.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UnknownParameter`] when any key is not
    /// accepted by this device type; nothing is assigned in that case.
    pub fn apply(&mut self, parameters: &Parameters) -> Result<ApplyReport, ValidationError> {
        if let Some(field) = parameters.keys().find(|field| !self.accepts(field)) {
            return Err(unknown_parameter(self.device_type(), field));
        }

        let mut report = ApplyReport::default();
        for (field, value) in parameters {
            let result = match field.as_str() {
                "room" => params::read_str("room", value).map(|room| self.room = room.to_string()),
                "name" => params::read_str("name", value).map(|name| self.name = name.to_string()),
                "status" => self.kind.set_status(value),
                other => self.kind.set(other, value),
            };
            match result {
                Ok(()) => {
                    tracing::info!(device_id = %self.id, %field, %value, "parameter set");
                    report.applied.push(field.clone());
                }
                Err(err) => {
                    tracing::warn!(device_id = %self.id, %field, %value, error = %err, "incorrect parameter value");
                    report.rejected.push((field.clone(), err));
                }
            }
        }
        Ok(report)
    }

    /// Snapshot in the creation-request shape
    /// (`{id, room, name, type, status, parameters}`).
    #[must_use]
    pub fn to_spec(&self) -> Value {
        json!({
            "id": self.id,
            "room": self.room,
            "name": self.name,
            "type": self.device_type(),
            "status": self.status(),
            "parameters": self.kind.parameters(),
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::drift::Drift;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    pub(crate) fn device(value: Value) -> Device {
        let spec = DeviceSpec::from_value(&value).unwrap();
        Device::from_spec(&spec).unwrap()
    }

    pub(crate) fn quiet_tick(device: &mut Device) -> TickOutcome {
        let mut rng = StdRng::seed_from_u64(0);
        let mut ctx = TickContext::new(&mut rng, Drift::with_chance(0.0), crate::time::now());
        device.tick(&mut ctx)
    }

    pub(crate) fn drifting_tick(device: &mut Device, seed: u64) -> TickOutcome {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut ctx = TickContext::new(&mut rng, Drift::with_chance(1.0), crate::time::now());
        device.tick(&mut ctx)
    }

    fn contents(value: Value) -> Parameters {
        value.as_object().cloned().unwrap()
    }

    fn sample_devices() -> Vec<Device> {
        vec![
            device(json!({"id": "wh", "room": "bath", "name": "Boiler", "type": "water_heater"})),
            device(json!({"id": "li", "room": "hall", "name": "Lamp", "type": "light",
                "parameters": {"is_dimmable": true, "dynamic_color": true}})),
            device(json!({"id": "ac", "room": "bed", "name": "AC", "type": "air_conditioner"})),
            device(json!({"id": "dl", "room": "door", "name": "Lock", "type": "door_lock"})),
            device(json!({"id": "cu", "room": "living", "name": "Drapes", "type": "curtain"})),
        ]
    }

    #[test]
    fn should_keep_shared_fields_from_spec() {
        let lamp = device(json!({"id": "l1", "room": "hall", "name": "Lamp", "type": "light"}));
        assert_eq!(lamp.id(), "l1");
        assert_eq!(lamp.room(), "hall");
        assert_eq!(lamp.name(), "Lamp");
        assert_eq!(lamp.device_type(), DeviceType::Light);
        assert_eq!(lamp.status(), "off");
    }

    #[test]
    fn should_apply_room_and_name_to_any_type() {
        for mut device in sample_devices() {
            let report = device
                .apply(&contents(json!({"room": "attic", "name": "Renamed"})))
                .unwrap();
            assert!(report.is_clean());
            assert_eq!(device.room(), "attic");
            assert_eq!(device.name(), "Renamed");
        }
    }

    #[test]
    fn should_reject_whole_call_when_key_is_unknown() {
        let mut lamp = device(json!({"id": "l1", "room": "hall", "name": "Lamp", "type": "light"}));
        let before = lamp.clone();
        let result = lamp.apply(&contents(json!({"name": "Changed", "position": 10})));
        assert!(matches!(
            result,
            Err(ValidationError::UnknownParameter { ref field, device_type: DeviceType::Light }) if field == "position"
        ));
        assert_eq!(lamp, before);
    }

    #[test]
    fn should_skip_invalid_field_and_apply_the_rest() {
        let mut lamp = device(json!({"id": "l1", "room": "hall", "name": "Lamp", "type": "light",
            "parameters": {"is_dimmable": true}}));
        let report = lamp
            .apply(&contents(json!({"brightness": 150, "status": "on", "color": "#00FF00"})))
            .unwrap();
        assert_eq!(report.rejected.len(), 1);
        assert_eq!(report.rejected[0].0, "brightness");
        assert_eq!(lamp.status(), "on");
        assert_eq!(lamp.to_spec()["parameters"]["brightness"], json!(80));
        assert_eq!(lamp.to_spec()["parameters"]["color"], json!("#00FF00"));
    }

    #[test]
    fn should_keep_status_when_value_belongs_to_another_type() {
        for mut device in sample_devices() {
            let before = device.status();
            let report = device.apply(&contents(json!({"status": "ajar"}))).unwrap();
            assert_eq!(report.rejected.len(), 1);
            assert_eq!(device.status(), before);
        }
    }

    #[test]
    fn should_be_idempotent_when_applied_twice() {
        for mut device in sample_devices() {
            let outcome = drifting_tick(&mut device.clone(), 42);
            let mut once = device.clone();
            once.apply(&outcome.update).unwrap();
            device.apply(&outcome.update).unwrap();
            device.apply(&outcome.update).unwrap();
            assert_eq!(device, once);
        }
    }

    #[test]
    fn should_reproduce_state_from_update_parameters() {
        for seed in 0..50 {
            for original in sample_devices() {
                let mut ticked = original.clone();
                let outcome = drifting_tick(&mut ticked, seed);
                if outcome.update.is_empty() {
                    continue;
                }
                let mut replica = original.clone();
                replica.apply(&outcome.update).unwrap();
                assert_eq!(replica.status(), ticked.status());
            }
        }
    }

    #[test]
    fn should_keep_status_within_vocabulary_across_ticks() {
        for mut device in sample_devices() {
            let valid: &[&str] = match device.device_type() {
                DeviceType::Curtain => &["open", "closed"],
                DeviceType::DoorLock => &["locked", "unlocked"],
                _ => &["on", "off"],
            };
            for seed in 0..100 {
                drifting_tick(&mut device, seed);
                assert!(valid.contains(&device.status()));
            }
        }
    }

    #[test]
    fn should_change_the_drifted_field() {
        for seed in 0..200 {
            for mut device in sample_devices() {
                let before = device.to_spec();
                let outcome = drifting_tick(&mut device, seed);
                let after = device.to_spec();
                for (field, value) in outcome.update.iter().chain(outcome.action.iter()) {
                    let previous = if field == "status" {
                        &before["status"]
                    } else {
                        &before["parameters"][field.as_str()]
                    };
                    let current = if field == "status" {
                        &after["status"]
                    } else {
                        &after["parameters"][field.as_str()]
                    };
                    assert_eq!(current, value);
                    assert_ne!(previous, value, "{field} of {} did not change", device.id());
                }
            }
        }
    }

    #[test]
    fn should_export_creation_shape() {
        let lock = device(json!({"id": "d1", "room": "door", "name": "Front", "type": "door_lock"}));
        let spec = lock.to_spec();
        assert_eq!(spec["type"], json!("door_lock"));
        assert_eq!(spec["status"], json!("unlocked"));
        assert_eq!(spec["parameters"]["battery_level"], json!(100));
    }
}
