//! Transport port — the message bus the simulator talks over.

use std::future::Future;

use homesim_domain::error::SimError;

use crate::protocol::OutboundMessage;

/// Publishes outbound messages and registers topic subscriptions.
///
/// Inbound messages are delivered out of band (the MQTT adapter pushes them
/// through a channel consumed by the
/// [`Dispatcher`](crate::services::dispatcher::Dispatcher)).
pub trait Transport: Send + Sync {
    /// Hand a message to the transport. Delivery is fire-and-forget from
    /// the caller's point of view; retries are the transport's concern.
    fn publish(&self, message: OutboundMessage)
    -> impl Future<Output = Result<(), SimError>> + Send;

    /// Subscribe to a topic pattern (`<root>/#`).
    fn subscribe(&self, pattern: &str) -> impl Future<Output = Result<(), SimError>> + Send;
}

impl<T: Transport> Transport for std::sync::Arc<T> {
    fn publish(
        &self,
        message: OutboundMessage,
    ) -> impl Future<Output = Result<(), SimError>> + Send {
        (**self).publish(message)
    }

    fn subscribe(&self, pattern: &str) -> impl Future<Output = Result<(), SimError>> + Send {
        (**self).subscribe(pattern)
    }
}
