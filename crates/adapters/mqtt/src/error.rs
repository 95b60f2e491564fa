//! MQTT adapter error types.

use homesim_domain::error::SimError;

/// Errors specific to the MQTT adapter.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The rumqttc client refused the request (queue full or event loop gone).
    #[error("MQTT client error")]
    Client(#[source] rumqttc::v5::ClientError),

    /// An incoming publish carried a topic that is not UTF-8.
    #[error("MQTT topic is not valid UTF-8")]
    Topic(#[source] std::str::Utf8Error),
}

impl MqttError {
    /// Convert into a [`SimError::Transport`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> SimError {
        SimError::Transport(Box::new(self))
    }
}

impl From<MqttError> for SimError {
    fn from(err: MqttError) -> Self {
        err.into_domain()
    }
}
