//! Mapping between protocol messages and MQTT v5 packets.

use rumqttc::v5::mqttbytes::QoS;
use rumqttc::v5::mqttbytes::v5::PublishProperties;

use homesim_app::protocol::{DeliveryGuarantee, InboundMessage, SENDER_ID_PROPERTY};

use crate::error::MqttError;

pub(crate) fn qos(delivery: DeliveryGuarantee) -> QoS {
    match delivery {
        DeliveryGuarantee::AtMostOnce => QoS::AtMostOnce,
        DeliveryGuarantee::AtLeastOnce => QoS::AtLeastOnce,
        DeliveryGuarantee::ExactlyOnce => QoS::ExactlyOnce,
    }
}

/// Publish properties carrying the sender identity as a user property.
pub(crate) fn publish_properties(sender_id: &str) -> PublishProperties {
    PublishProperties {
        user_properties: vec![(SENDER_ID_PROPERTY.to_string(), sender_id.to_string())],
        ..Default::default()
    }
}

/// Build an [`InboundMessage`] from the parts of a received publish.
pub(crate) fn inbound(
    topic: &[u8],
    payload: &[u8],
    properties: Option<&PublishProperties>,
) -> Result<InboundMessage, MqttError> {
    let topic = std::str::from_utf8(topic).map_err(MqttError::Topic)?;
    let sender_id = properties.and_then(|props| {
        props
            .user_properties
            .iter()
            .find(|(key, _)| key == SENDER_ID_PROPERTY)
            .map(|(_, value)| value.clone())
    });
    Ok(InboundMessage {
        topic: topic.to_string(),
        payload: payload.to_vec(),
        sender_id,
    })
}
