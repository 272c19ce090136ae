use crate::topic::Topic;
use bytes::Bytes;
use num_enum::TryFromPrimitive;
use properties::*;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFromPrimitive)]
pub enum QoS {
    AtMostOnce = 0,  // QoS 0
    AtLeastOnce = 1, // QoS 1
    ExactlyOnce = 2, // QoS 2
}

pub mod properties {
    use super::VariableByteInt;
    use bytes::Bytes;

    // Property structs
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PayloadFormatIndicator(pub u8);

    /// Lifetime of an application message in seconds.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MessageExpiryInterval(pub u32);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ContentType(pub String);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ResponseTopic(pub String);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CorrelationData(pub Bytes);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct SubscriptionIdentifier(pub VariableByteInt);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TopicAlias(pub u16);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct UserProperty(pub String, pub String);

    /// Properties which may appear on a PUBLISH packet.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum Property {
        PayloadFormatIndicator(PayloadFormatIndicator),
        MessageExpiryInterval(MessageExpiryInterval),
        ContentType(ContentType),
        ResponseTopic(ResponseTopic),
        CorrelationData(CorrelationData),
        SubscriptionIdentifier(SubscriptionIdentifier),
        TopicAlias(TopicAlias),
        UserProperty(UserProperty),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableByteInt(pub u32);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishPacket {
    // Fixed header
    pub is_duplicate: bool,
    pub qos: QoS,
    pub retain: bool,

    // Variable header
    pub topic: Topic,
    pub packet_id: Option<u16>,

    // Properties
    pub payload_format_indicator: Option<PayloadFormatIndicator>,
    pub message_expiry_interval: Option<MessageExpiryInterval>,
    pub topic_alias: Option<TopicAlias>,
    pub response_topic: Option<ResponseTopic>,
    pub correlation_data: Option<CorrelationData>,
    pub user_properties: Vec<UserProperty>,
    pub subscription_identifiers: Vec<SubscriptionIdentifier>,
    pub content_type: Option<ContentType>,

    // Payload
    pub payload: Bytes,
}

impl PublishPacket {
    /// A publish with no packet ID and no properties set.
    pub fn new(topic: Topic, qos: QoS, retain: bool, payload: Bytes) -> Self {
        Self {
            is_duplicate: false,
            qos,
            retain,

            topic,
            packet_id: None,

            payload_format_indicator: None,
            message_expiry_interval: None,
            topic_alias: None,
            response_topic: None,
            correlation_data: None,
            user_properties: Vec::new(),
            subscription_identifiers: Vec::new(),
            content_type: None,

            payload,
        }
    }

    /// The application-level properties of this publish, in wire order.
    /// Topic aliases and subscription identifiers are connection-specific
    /// and are not included.
    pub fn application_properties(&self) -> Vec<Property> {
        let mut properties = Vec::with_capacity(5 + self.user_properties.len());

        if let Some(p) = &self.payload_format_indicator {
            properties.push(Property::PayloadFormatIndicator(p.clone()));
        }

        if let Some(p) = &self.message_expiry_interval {
            properties.push(Property::MessageExpiryInterval(p.clone()));
        }

        if let Some(p) = &self.content_type {
            properties.push(Property::ContentType(p.clone()));
        }

        if let Some(p) = &self.response_topic {
            properties.push(Property::ResponseTopic(p.clone()));
        }

        if let Some(p) = &self.correlation_data {
            properties.push(Property::CorrelationData(p.clone()));
        }

        properties.extend(self.user_properties.iter().cloned().map(Property::UserProperty));

        properties
    }

    /// Sets the property fields of this publish from a property list.
    /// Later values of single-valued properties overwrite earlier ones.
    pub fn apply_properties<'a>(&mut self, properties: impl IntoIterator<Item = &'a Property>) {
        for property in properties {
            match property {
                Property::PayloadFormatIndicator(p) => {
                    self.payload_format_indicator = Some(p.clone())
                },
                Property::MessageExpiryInterval(p) => {
                    self.message_expiry_interval = Some(p.clone())
                },
                Property::ContentType(p) => self.content_type = Some(p.clone()),
                Property::ResponseTopic(p) => self.response_topic = Some(p.clone()),
                Property::CorrelationData(p) => self.correlation_data = Some(p.clone()),
                Property::SubscriptionIdentifier(p) => {
                    self.subscription_identifiers.push(p.clone())
                },
                Property::TopicAlias(p) => self.topic_alias = Some(p.clone()),
                Property::UserProperty(p) => self.user_properties.push(p.clone()),
            }
        }
    }
}
