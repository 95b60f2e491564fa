//! Wire protocol — topic layout, payload envelope and message metadata.
//!
//! Every device lives under `<root>/<device_id>/<method>`. Action and
//! update payloads are `{"contents": {<field>: <value>, …}}`; post payloads
//! are a full creation request; delete payloads are ignored. The sender
//! identity travels beside the payload, never inside it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use homesim_domain::error::ProtocolError;
use homesim_domain::params::Parameters;

/// Default topic root.
pub const DEFAULT_ROOT: &str = "project/home";

/// Name of the metadata entry carrying the sender identity.
pub const SENDER_ID_PROPERTY: &str = "sender_id";

/// Sub-topic naming what a message asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Changes a device decided on its own.
    Action,
    /// Externally relevant status changes.
    Update,
    /// Create a device.
    Post,
    /// Remove a device.
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Action => "action",
            Self::Update => "update",
            Self::Post => "post",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "action" => Ok(Self::Action),
            "update" => Ok(Self::Update),
            "post" => Ok(Self::Post),
            "delete" => Ok(Self::Delete),
            other => Err(ProtocolError::UnknownMethod(other.to_string())),
        }
    }
}

/// A parsed `<root>/<device_id>/<method>` topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub device_id: String,
    pub method: Method,
}

impl Topic {
    /// Parse `topic` against `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::MalformedTopic`] when the topic is outside
    /// `root` or does not have exactly two segments below it, and
    /// [`ProtocolError::UnknownMethod`] for an unrecognised last segment.
    pub fn parse(root: &str, topic: &str) -> Result<Self, ProtocolError> {
        let malformed = || ProtocolError::MalformedTopic(topic.to_string());
        let rest = topic
            .strip_prefix(root)
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(malformed)?;
        let mut segments = rest.split('/');
        let (Some(device_id), Some(method), None) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(malformed());
        };
        if device_id.is_empty() {
            return Err(malformed());
        }
        Ok(Self {
            device_id: device_id.to_string(),
            method: method.parse()?,
        })
    }

    /// Render the full topic string under `root`.
    #[must_use]
    pub fn render(&self, root: &str) -> String {
        format!("{root}/{}/{}", self.device_id, self.method)
    }
}

/// Action/update payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub contents: Parameters,
}

/// How hard the transport should try to deliver a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryGuarantee {
    AtMostOnce,
    AtLeastOnce,
    #[default]
    ExactlyOnce,
}

/// A message received from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    /// Sender identity from the message metadata, if any.
    pub sender_id: Option<String>,
}

/// A message for the transport to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub topic: String,
    pub payload: Vec<u8>,
    pub delivery: DeliveryGuarantee,
    pub sender_id: String,
}

/// Identity stamped on every outbound message and used to drop our own
/// messages when they come back.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SenderId(String);

impl SenderId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// `simulator-<hostname>`.
    #[must_use]
    pub fn for_host(hostname: &str) -> Self {
        Self(format!("simulator-{hostname}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
