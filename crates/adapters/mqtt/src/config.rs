//! MQTT transport configuration.

use serde::Deserialize;

use homesim_app::protocol::DEFAULT_ROOT;

/// Configuration for the MQTT transport.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    /// Broker host name.
    pub broker_host: String,
    /// MQTT broker port.
    pub broker_port: u16,
    /// MQTT client identifier, also stamped on every message as `sender_id`.
    pub client_id: String,
    /// Topic root every device topic lives under.
    pub topic_root: String,
    /// Seconds between keep-alive pings.
    pub keep_alive_secs: u16,
    /// Capacity of the request and inbound channels.
    pub channel_capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: "test.mosquitto.org".to_string(),
            broker_port: 1883,
            client_id: "simulator-localhost".to_string(),
            topic_root: DEFAULT_ROOT.to_string(),
            keep_alive_secs: 60,
            channel_capacity: 64,
        }
    }
}
