//! Router — turns inbound messages into registry operations and tick
//! outcomes into outbound messages.

use serde::de::DeserializeOwned;
use serde_json::Value;

use homesim_domain::error::{ProtocolError, SimError};
use homesim_domain::params::{ApplyReport, Parameters, TickOutcome};
use homesim_domain::registry::Registry;

use crate::protocol::{
    DeliveryGuarantee, Envelope, InboundMessage, Method, OutboundMessage, SenderId, Topic,
};

/// What handling an inbound message did.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The message came from this process and was ignored.
    Echo,
    /// An action or update was applied field by field.
    Applied {
        device_id: String,
        report: ApplyReport,
    },
    Created {
        device_id: String,
    },
    Deleted {
        device_id: String,
    },
}

/// Stateless message router bound to one sender identity and topic root.
#[derive(Debug, Clone)]
pub struct Router {
    identity: SenderId,
    root: String,
}

impl Router {
    #[must_use]
    pub fn new(identity: SenderId, root: impl Into<String>) -> Self {
        Self {
            identity,
            root: root.into().trim_end_matches('/').to_string(),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &SenderId {
        &self.identity
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Pattern matching every device topic under the root.
    #[must_use]
    pub fn subscription(&self) -> String {
        format!("{}/#", self.root)
    }

    /// Apply one inbound message to the registry.
    ///
    /// Messages stamped with this router's own identity are ignored before
    /// the topic or payload is even looked at.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Protocol`] for a missing sender, a malformed
    /// topic or an undecodable payload, [`SimError::NotFound`] when the
    /// addressed device does not exist, and [`SimError::Validation`] or
    /// [`SimError::Duplicate`] when the registry rejects the request.
    pub fn route(
        &self,
        registry: &mut Registry,
        message: &InboundMessage,
    ) -> Result<Outcome, SimError> {
        let sender = message
            .sender_id
            .as_deref()
            .ok_or(ProtocolError::MissingSender)?;
        if sender == self.identity.as_str() {
            return Ok(Outcome::Echo);
        }

        let topic = Topic::parse(&self.root, &message.topic)?;
        match topic.method {
            Method::Action | Method::Update => {
                let envelope: Envelope = decode(&message.payload)?;
                let device = registry.find_mut(&topic.device_id)?;
                let report = device.apply(&envelope.contents)?;
                Ok(Outcome::Applied {
                    device_id: topic.device_id,
                    report,
                })
            }
            Method::Post => {
                let request: Value = decode(&message.payload)?;
                let device = registry.create_from_value(&request)?;
                Ok(Outcome::Created {
                    device_id: device.id().to_string(),
                })
            }
            Method::Delete => {
                registry.delete(&topic.device_id)?;
                Ok(Outcome::Deleted {
                    device_id: topic.device_id,
                })
            }
        }
    }

    /// Messages announcing what a tick changed: the action parameters on
    /// `<root>/<id>/action`, the update parameters on `<root>/<id>/update`,
    /// each only when non-empty.
    #[must_use]
    pub fn outbound(&self, device_id: &str, outcome: &TickOutcome) -> Vec<OutboundMessage> {
        [
            (Method::Action, &outcome.action),
            (Method::Update, &outcome.update),
        ]
        .into_iter()
        .filter(|(_, contents)| !contents.is_empty())
        .filter_map(|(method, contents)| self.message(device_id, method, contents))
        .collect()
    }

    fn message(
        &self,
        device_id: &str,
        method: Method,
        contents: &Parameters,
    ) -> Option<OutboundMessage> {
        let envelope = Envelope {
            contents: contents.clone(),
        };
        let payload = serde_json::to_vec(&envelope)
            .inspect_err(|err| tracing::error!(%device_id, error = %err, "failed to encode payload"))
            .ok()?;
        let topic = Topic {
            device_id: device_id.to_string(),
            method,
        };
        Some(OutboundMessage {
            topic: topic.render(&self.root),
            payload,
            delivery: DeliveryGuarantee::ExactlyOnce,
            sender_id: self.identity.to_string(),
        })
    }
}

fn decode<T: DeserializeOwned>(payload: &[u8]) -> Result<T, ProtocolError> {
    let text = std::str::from_utf8(payload).map_err(ProtocolError::NotUtf8)?;
    serde_json::from_str(text).map_err(ProtocolError::Payload)
}
