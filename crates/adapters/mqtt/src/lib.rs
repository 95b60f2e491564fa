//! # homesim-adapter-mqtt
//!
//! MQTT adapter — carries simulator traffic over an MQTT v5 broker.
//!
//! ## How it works
//!
//! [`MqttTransport::connect`] builds a `rumqttc` client and spawns a task
//! that drives its event loop. Incoming publishes are converted to
//! [`InboundMessage`]s and pushed into the channel handed to `connect`;
//! the sender identity is read from the `sender_id` user property.
//! Subscriptions are remembered and re-issued on every (re)connect.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `homesim-app` and `homesim-domain`.

mod config;
mod convert;
mod error;

pub use config::MqttConfig;
pub use error::MqttError;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use rumqttc::Outgoing;
use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::Packet;
use rumqttc::v5::{AsyncClient, Event, EventLoop, MqttOptions};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use homesim_app::ports::Transport;
use homesim_app::protocol::{InboundMessage, OutboundMessage};
use homesim_domain::error::SimError;

/// Pause between reconnect attempts after an event loop error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// How long [`MqttTransport::disconnect`] waits for the event loop to
/// flush the disconnect packet.
const DISCONNECT_GRACE: Duration = Duration::from_secs(1);

/// Subscription bookkeeping shared with the event loop task.
#[derive(Debug, Default)]
struct Subscriptions {
    patterns: Vec<String>,
    connected: bool,
}

/// MQTT implementation of the [`Transport`] port.
pub struct MqttTransport {
    client: AsyncClient,
    subscriptions: Arc<Mutex<Subscriptions>>,
    event_loop: Option<JoinHandle<()>>,
}

impl MqttTransport {
    /// Create the client and spawn its event loop. Connection happens in
    /// the background; inbound publishes are sent to `inbound`.
    #[must_use]
    pub fn connect(config: &MqttConfig, inbound: mpsc::Sender<InboundMessage>) -> Self {
        let mut options = MqttOptions::new(
            config.client_id.clone(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(Duration::from_secs(u64::from(config.keep_alive_secs)));
        let (client, eventloop) = AsyncClient::new(options, config.channel_capacity);
        let subscriptions = Arc::new(Mutex::new(Subscriptions::default()));

        let handle = tokio::spawn(run_event_loop(
            eventloop,
            client.clone(),
            Arc::clone(&subscriptions),
            inbound,
        ));
        tracing::info!(
            host = %config.broker_host,
            port = config.broker_port,
            client_id = %config.client_id,
            "MQTT event loop started"
        );

        Self {
            client,
            subscriptions,
            event_loop: Some(handle),
        }
    }

    /// Send a disconnect to the broker and stop the event loop.
    pub async fn disconnect(&mut self) {
        if let Err(err) = self.client.disconnect().await {
            tracing::warn!(error = %err, "failed to request MQTT disconnect");
        }
        if let Some(mut handle) = self.event_loop.take() {
            if tokio::time::timeout(DISCONNECT_GRACE, &mut handle).await.is_err() {
                handle.abort();
                tracing::debug!("MQTT event loop aborted");
            }
        }
        tracing::info!("MQTT transport stopped");
    }
}

impl Transport for MqttTransport {
    async fn publish(&self, message: OutboundMessage) -> Result<(), SimError> {
        tracing::trace!(topic = %message.topic, "MQTT publish");
        self.client
            .try_publish_with_properties(
                message.topic,
                convert::qos(message.delivery),
                false,
                message.payload,
                convert::publish_properties(&message.sender_id),
            )
            .map_err(MqttError::Client)?;
        Ok(())
    }

    async fn subscribe(&self, pattern: &str) -> Result<(), SimError> {
        let connected = {
            let mut subscriptions = self
                .subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            subscriptions.patterns.push(pattern.to_string());
            subscriptions.connected
        };
        // Otherwise the event loop subscribes once the broker acknowledges.
        if connected {
            self.client
                .try_subscribe(pattern, QoS::ExactlyOnce)
                .map_err(MqttError::Client)?;
        }
        Ok(())
    }
}

async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    subscriptions: Arc<Mutex<Subscriptions>>,
    inbound: mpsc::Sender<InboundMessage>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                tracing::info!("connected to MQTT broker");
                let patterns = {
                    let mut subscriptions =
                        subscriptions.lock().unwrap_or_else(PoisonError::into_inner);
                    subscriptions.connected = true;
                    subscriptions.patterns.clone()
                };
                for pattern in patterns {
                    match client.try_subscribe(pattern.clone(), QoS::ExactlyOnce) {
                        Ok(()) => tracing::info!(%pattern, "subscribed"),
                        Err(err) => tracing::warn!(%pattern, error = %err, "MQTT subscribe failed"),
                    }
                }
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = match convert::inbound(
                    &publish.topic,
                    &publish.payload,
                    publish.properties.as_ref(),
                ) {
                    Ok(message) => message,
                    Err(err) => {
                        tracing::warn!(error = %err, "MQTT publish skipped");
                        continue;
                    }
                };
                tracing::debug!(topic = %message.topic, "MQTT message received");
                if inbound.send(message).await.is_err() {
                    tracing::info!("inbound receiver dropped, stopping MQTT event loop");
                    break;
                }
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                tracing::info!("disconnected from MQTT broker");
                break;
            }
            Ok(_) => {}
            Err(err) => {
                subscriptions
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .connected = false;
                tracing::warn!(error = %err, "MQTT event loop error");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}
