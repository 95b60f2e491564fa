//! Device creation request, as received from `post` messages and the
//! bootstrap fetch.

use serde_json::Value;

use crate::device_type::DeviceType;
use crate::error::ValidationError;
use crate::params::Parameters;

/// Keys every creation request must carry.
pub const REQUIRED_FIELDS: &[&str] = &["id", "room", "name", "type"];

/// A structurally valid creation request.
///
/// Only the shape is checked here; type-specific values are validated when
/// the [`Device`](crate::device::Device) is built.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub id: String,
    pub room: String,
    pub name: String,
    pub device_type: DeviceType,
    pub status: Option<Value>,
    pub parameters: Parameters,
}

impl DeviceSpec {
    /// Parse a JSON creation request.
    ///
    /// # Errors
    ///
    /// Returns a validation error when the value is not an object, lacks
    /// any of [`REQUIRED_FIELDS`], names an unknown type, or carries a
    /// non-object `parameters` entry.
    pub fn from_value(value: &Value) -> Result<Self, ValidationError> {
        let object = value.as_object().ok_or(ValidationError::WrongType {
            field: "device",
            expected: "object",
        })?;

        let missing: Vec<&'static str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| object.get(*field).is_none_or(Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        let text = |field: &'static str| {
            object
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(ValidationError::WrongType {
                    field,
                    expected: "string",
                })
        };

        let parameters = match object.get("parameters") {
            None | Some(Value::Null) => Parameters::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(_) => {
                return Err(ValidationError::WrongType {
                    field: "parameters",
                    expected: "object",
                });
            }
        };

        Ok(Self {
            id: text("id")?,
            room: text("room")?,
            name: text("name")?,
            device_type: text("type")?.parse()?,
            status: object.get("status").filter(|status| !status.is_null()).cloned(),
            parameters,
        })
    }
}
