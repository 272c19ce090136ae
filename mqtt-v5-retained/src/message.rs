use bytes::Bytes;
use mqtt_v5::{
    topic::Topic,
    types::{
        properties::{MessageExpiryInterval, Property},
        PublishPacket, QoS,
    },
};
use std::{convert::TryFrom, time::Instant};

/// The last message published with the retain flag set on a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetainedMessage {
    topic: Topic,
    qos: QoS,
    payload: Bytes,
    properties: Vec<Property>,
    expiry: Option<Instant>,
}

impl RetainedMessage {
    /// A message retained until it is cleaned. Any message expiry interval
    /// in `properties` is dropped so it isn't replayed forever.
    pub fn new(topic: Topic, qos: QoS, payload: Bytes, mut properties: Vec<Property>) -> Self {
        properties.retain(|property| !matches!(property, Property::MessageExpiryInterval(_)));

        Self { topic, qos, payload, properties, expiry: None }
    }

    pub fn with_expiry(
        topic: Topic,
        qos: QoS,
        payload: Bytes,
        properties: Vec<Property>,
        expiry: Instant,
    ) -> Self {
        Self { topic, qos, payload, properties, expiry: Some(expiry) }
    }

    /// Captures the parts of `packet` which survive retention. `topic` is
    /// used instead of the packet's topic, as the caller may have resolved
    /// a topic alias.
    pub fn from_publish(topic: Topic, packet: &PublishPacket, expiry: Option<Instant>) -> Self {
        let qos = packet.qos;
        let payload = packet.payload.clone();
        let properties = packet.application_properties();

        match expiry {
            Some(expiry) => Self::with_expiry(topic, qos, payload, properties, expiry),
            None => Self::new(topic, qos, payload, properties),
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn qos(&self) -> QoS {
        self.qos
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// None for messages which are retained until explicitly cleaned.
    pub fn expiry(&self) -> Option<Instant> {
        self.expiry
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expiry {
            Some(expiry) => expiry <= now,
            None => false,
        }
    }

    /// Builds the publish sent to a new subscriber. The message expiry
    /// interval is rewritten to the time left until `expiry`.
    pub fn to_publish_packet(&self, now: Instant) -> PublishPacket {
        let mut packet =
            PublishPacket::new(self.topic.clone(), self.qos, true, self.payload.clone());
        packet.apply_properties(&self.properties);

        if let Some(expiry) = self.expiry {
            let remaining_secs = expiry.saturating_duration_since(now).as_secs();
            let remaining_secs = u32::try_from(remaining_secs).unwrap_or(u32::MAX);
            packet.message_expiry_interval = Some(MessageExpiryInterval(remaining_secs));
        }

        packet
    }
}
