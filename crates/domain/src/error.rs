//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into [`SimError`]
//! via `#[from]`. Every variant except the transport one is recoverable:
//! callers log it and carry on.

use crate::device_type::DeviceType;

/// Base error type shared by every homesim crate.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("{0}")]
    Duplicate(#[from] DuplicateError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Failure reported by a transport or bootstrap adapter.
    #[error("transport error")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A value or request that violates a device invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
        value: i64,
    },

    #[error("{value:?} is not a valid value for {field}")]
    InvalidChoice { field: &'static str, value: String },

    #[error("color must be a #RGB or #RRGGBB hex code, got {0:?}")]
    InvalidColor(String),

    #[error("invalid time string {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("{field} must be a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("unknown device type {0:?}")]
    UnknownType(String),

    #[error("incorrect parameter {field:?} for device type {device_type}")]
    UnknownParameter {
        field: String,
        device_type: DeviceType,
    },
}

/// A lookup that matched nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id:?} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A creation request whose id is already taken.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device id {id:?} already exists")]
pub struct DuplicateError {
    pub id: String,
}

/// A transport message that cannot be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message missing sender")]
    MissingSender,

    #[error("incorrect topic {0:?}")]
    MalformedTopic(String),

    #[error("unknown method {0:?}")]
    UnknownMethod(String),

    #[error("payload is not valid UTF-8")]
    NotUtf8(#[source] std::str::Utf8Error),

    #[error("failed to decode payload")]
    Payload(#[source] serde_json::Error),
}
