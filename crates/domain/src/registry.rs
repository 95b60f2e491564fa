//! Registry — the authoritative store of live devices, keyed by id.

use std::collections::HashMap;

use serde_json::Value;

use crate::device::Device;
use crate::error::{DuplicateError, NotFoundError, SimError};
use crate::spec::DeviceSpec;

const ENTITY: &str = "Device";

/// Owns every live [`Device`]. No two devices share an id.
#[derive(Debug, Default)]
pub struct Registry {
    devices: HashMap<String, Device>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and insert a device from a parsed creation request.
    ///
    /// The registry is left untouched on any error.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Duplicate`] when the id is taken and
    /// [`SimError::Validation`] when a value is out of its domain.
    pub fn create(&mut self, spec: &DeviceSpec) -> Result<&Device, SimError> {
        if self.devices.contains_key(&spec.id) {
            return Err(DuplicateError {
                id: spec.id.clone(),
            }
            .into());
        }
        let device = Device::from_spec(spec)?;
        tracing::info!(device_id = %spec.id, device_type = %spec.device_type, "device added");
        Ok(self.devices.entry(spec.id.clone()).or_insert(device))
    }

    /// Parse a raw JSON creation request and insert it.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Validation`] for malformed requests, plus every
    /// error of [`create`](Self::create).
    pub fn create_from_value(&mut self, value: &Value) -> Result<&Device, SimError> {
        let spec = DeviceSpec::from_value(value)?;
        self.create(&spec)
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no device has this id.
    pub fn find(&self, id: &str) -> Result<&Device, NotFoundError> {
        self.devices.get(id).ok_or_else(|| not_found(id))
    }

    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no device has this id.
    pub fn find_mut(&mut self, id: &str) -> Result<&mut Device, NotFoundError> {
        self.devices.get_mut(id).ok_or_else(|| not_found(id))
    }

    /// Remove a device and hand it back.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundError`] when no device has this id.
    pub fn delete(&mut self, id: &str) -> Result<Device, NotFoundError> {
        let device = self.devices.remove(id).ok_or_else(|| not_found(id))?;
        tracing::info!(device_id = %id, "device deleted");
        Ok(device)
    }

    /// Visit every device mutably, in unspecified order.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut Device)) {
        self.devices.values_mut().for_each(|device| f(device));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.devices.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Ids of every device, sorted.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.devices.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

fn not_found(id: &str) -> NotFoundError {
    NotFoundError {
        entity: ENTITY,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use serde_json::json;

    fn lamp(id: &str) -> Value {
        json!({"id": id, "room": "hall", "name": "Lamp", "type": "light"})
    }

    #[test]
    fn should_create_and_find_device() {
        let mut registry = Registry::new();
        registry.create_from_value(&lamp("l1")).unwrap();
        assert_eq!(registry.find("l1").unwrap().name(), "Lamp");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_reject_duplicate_id_without_mutation() {
        let mut registry = Registry::new();
        registry.create_from_value(&lamp("l1")).unwrap();
        let duplicate = json!({"id": "l1", "room": "attic", "name": "Other", "type": "curtain"});
        let result = registry.create_from_value(&duplicate);
        assert!(matches!(result, Err(SimError::Duplicate(DuplicateError { ref id })) if id == "l1"));
        let kept = registry.find("l1").unwrap();
        assert_eq!(kept.room(), "hall");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn should_not_add_device_missing_room() {
        let mut registry = Registry::new();
        let result = registry.create_from_value(&json!({"id": "l1", "name": "Lamp", "type": "light"}));
        assert!(matches!(
            result,
            Err(SimError::Validation(ValidationError::MissingFields(ref fields))) if fields == &vec!["room"]
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn should_not_add_device_with_invalid_parameter() {
        let mut registry = Registry::new();
        let request = json!({"id": "l1", "room": "hall", "name": "Lamp", "type": "light",
            "parameters": {"brightness": 150}});
        assert!(registry.create_from_value(&request).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn should_report_missing_device() {
        let mut registry = Registry::new();
        let err = registry.delete("ghost").unwrap_err();
        assert_eq!(err.id, "ghost");
        assert!(registry.find_mut("ghost").is_err());
    }

    #[test]
    fn should_delete_device() {
        let mut registry = Registry::new();
        registry.create_from_value(&lamp("l1")).unwrap();
        registry.create_from_value(&lamp("l2")).unwrap();
        let removed = registry.delete("l1").unwrap();
        assert_eq!(removed.id(), "l1");
        assert_eq!(registry.ids(), vec!["l2"]);
    }

    #[test]
    fn should_visit_every_device() {
        let mut registry = Registry::new();
        for id in ["a", "b", "c"] {
            registry.create_from_value(&lamp(id)).unwrap();
        }
        let mut visited = Vec::new();
        registry.for_each_mut(|device| visited.push(device.id().to_string()));
        visited.sort();
        assert_eq!(visited, vec!["a", "b", "c"]);
    }
}
