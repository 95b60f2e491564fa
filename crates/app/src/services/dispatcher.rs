//! Inbound dispatcher — drains the transport's receive channel into the
//! router, one message at a time under the registry lock.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use homesim_domain::error::SimError;

use super::SharedRegistry;
use crate::protocol::InboundMessage;
use crate::router::{Outcome, Router};

pub struct Dispatcher {
    registry: SharedRegistry,
    router: Router,
}

impl Dispatcher {
    #[must_use]
    pub fn new(registry: SharedRegistry, router: Router) -> Self {
        Self { registry, router }
    }

    /// Handle one message. Errors are logged here and never propagate, so a
    /// bad message cannot stop the receive loop.
    #[tracing::instrument(skip(self, message), fields(topic = %message.topic))]
    pub async fn handle(&self, message: &InboundMessage) -> Option<Outcome> {
        let result = {
            let mut registry = self.registry.lock().await;
            self.router.route(&mut registry, message)
        };
        match result {
            Ok(Outcome::Echo) => {
                tracing::trace!("ignoring own message");
                Some(Outcome::Echo)
            }
            Ok(outcome) => {
                tracing::debug!(?outcome, "message handled");
                Some(outcome)
            }
            Err(err) => {
                log_rejection(&err);
                None
            }
        }
    }

    /// Handle messages until every sender of `inbound` is dropped.
    pub async fn run(self, mut inbound: mpsc::Receiver<InboundMessage>) {
        while let Some(message) = inbound.recv().await {
            self.handle(&message).await;
        }
        tracing::info!("inbound channel closed, dispatcher stopping");
    }

    pub fn spawn(self, inbound: mpsc::Receiver<InboundMessage>) -> JoinHandle<()> {
        tokio::spawn(self.run(inbound))
    }
}

fn log_rejection(err: &SimError) {
    match err {
        SimError::Protocol(_) | SimError::Validation(_) => {
            tracing::warn!(error = %err, "message dropped");
        }
        SimError::NotFound(_) | SimError::Duplicate(_) | SimError::Transport(_) => {
            tracing::error!(error = %err, "message rejected");
        }
    }
}
