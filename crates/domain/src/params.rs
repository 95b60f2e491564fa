//! Parameter maps exchanged with the message bus, and typed readers for them.

use serde_json::Value;

use crate::bounds::Bounds;
use crate::error::ValidationError;

/// Field name → JSON value, as carried in a message's `contents`.
pub type Parameters = serde_json::Map<String, Value>;

/// Fields every device accepts regardless of its type.
pub const GENERAL_PARAMETERS: &[&str] = &["room", "name", "status"];

/// What a single tick changed, split by intent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Changes the device decided on its own (drift, drain, heating).
    pub action: Parameters,
    /// Status changes other simulators should also reflect.
    pub update: Parameters,
}

impl TickOutcome {
    pub fn record_action(&mut self, field: &str, value: impl Into<Value>) {
        self.action.insert(field.to_string(), value.into());
    }

    pub fn record_update(&mut self, field: &str, value: impl Into<Value>) {
        self.update.insert(field.to_string(), value.into());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.action.is_empty() && self.update.is_empty()
    }
}

/// Result of [`Device::apply`](crate::device::Device::apply): which fields
/// took effect and which were rejected.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    pub applied: Vec<String>,
    pub rejected: Vec<(String, ValidationError)>,
}

impl ApplyReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Read a JSON integer.
///
/// # Errors
///
/// Returns [`ValidationError::WrongType`] for anything but an integer.
pub fn read_int(field: &'static str, value: &Value) -> Result<i64, ValidationError> {
    value.as_i64().ok_or(ValidationError::WrongType {
        field,
        expected: "integer",
    })
}

/// Read a JSON integer and check it against `bounds`.
///
/// # Errors
///
/// Returns a validation error for non-integers and out-of-domain values.
pub fn read_bounded(bounds: Bounds, value: &Value) -> Result<i64, ValidationError> {
    bounds.check(read_int(bounds.field, value)?)
}

/// Read a JSON boolean.
///
/// # Errors
///
/// Returns [`ValidationError::WrongType`] for anything but a boolean.
pub fn read_bool(field: &'static str, value: &Value) -> Result<bool, ValidationError> {
    value.as_bool().ok_or(ValidationError::WrongType {
        field,
        expected: "boolean",
    })
}

/// Read a JSON string.
///
/// # Errors
///
/// Returns [`ValidationError::WrongType`] for anything but a string.
pub fn read_str<'v>(field: &'static str, value: &'v Value) -> Result<&'v str, ValidationError> {
    value.as_str().ok_or(ValidationError::WrongType {
        field,
        expected: "string",
    })
}
