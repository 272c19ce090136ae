use crate::message::RetainedMessage;
use dashmap::{mapref::entry::Entry, DashMap};
use log::{debug, info, trace};
use mqtt_v5::{
    topic::{Topic, TopicFilter},
    types::{properties::MessageExpiryInterval, PublishPacket},
};
use std::time::{Duration, Instant};

/// In-memory store of retained messages, safe to share between tasks.
///
/// Messages retained until cleaned and messages carrying an expiry are kept
/// in separate maps so an expiry sweep only has to look at the latter. A
/// topic lives in at most one of the two maps: the most recent retain for a
/// topic wins, whichever map it goes to.
///
/// Every write for a topic holds that topic's entry in `permanent` while it
/// touches `expiring`, so `permanent` is always locked before `expiring`.
#[derive(Debug, Default)]
pub struct RetainedMessageStore {
    permanent: DashMap<Topic, RetainedMessage>,
    expiring: DashMap<Topic, RetainedMessage>,
}

impl RetainedMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            permanent: DashMap::with_capacity(capacity),
            expiring: DashMap::with_capacity(capacity),
        }
    }

    /// Retain `packet` on `topic` until it is cleaned, replacing any
    /// message already retained there.
    pub fn retain(&self, topic: Topic, packet: &PublishPacket) {
        debug!(
            "Retaining message on topic {} (QoS {:?}, {} bytes)",
            topic,
            packet.qos,
            packet.payload.len()
        );

        let message = RetainedMessage::from_publish(topic.clone(), packet, None);
        let permanent_entry = self.permanent.entry(topic);
        self.expiring.remove(permanent_entry.key());
        permanent_entry.insert(message);
    }

    /// Retain `packet` on `topic` until `expiry_time`, replacing any
    /// message already retained there. Nothing is removed when the time
    /// passes, see `clean_expired`.
    pub fn retain_with_expiry(&self, topic: Topic, packet: &PublishPacket, expiry_time: Instant) {
        debug!(
            "Retaining expiring message on topic {} (QoS {:?}, {} bytes)",
            topic,
            packet.qos,
            packet.payload.len()
        );

        let message = RetainedMessage::from_publish(topic.clone(), packet, Some(expiry_time));
        let permanent_entry = self.permanent.entry(topic.clone());
        self.expiring.insert(topic, message);

        if let Entry::Occupied(permanent_entry) = permanent_entry {
            permanent_entry.remove();
        }
    }

    /// Store a retained publish as it arrives from a client. An empty
    /// payload clears the topic, and a message expiry interval makes the
    /// message expire that many seconds after `now`.
    /// Publishes without the retain flag are ignored.
    pub fn retain_publish(&self, packet: &PublishPacket, now: Instant) {
        if !packet.retain {
            return;
        }

        if packet.payload.is_empty() {
            self.clean(&packet.topic);
            return;
        }

        let expiry_time = match &packet.message_expiry_interval {
            Some(MessageExpiryInterval(secs)) => {
                now.checked_add(Duration::from_secs(u64::from(*secs)))
            },
            None => None,
        };

        match expiry_time {
            Some(expiry_time) => self.retain_with_expiry(packet.topic.clone(), packet, expiry_time),
            None => self.retain(packet.topic.clone(), packet),
        }
    }

    /// Remove whatever is retained on `topic`. Does nothing if there is none.
    pub fn clean(&self, topic: &Topic) {
        let permanent_entry = self.permanent.entry(topic.clone());
        let removed_expiring = self.expiring.remove(topic).is_some();

        let removed_permanent = match permanent_entry {
            Entry::Occupied(permanent_entry) => {
                permanent_entry.remove();
                true
            },
            Entry::Vacant(_) => false,
        };

        if removed_permanent || removed_expiring {
            debug!("Cleaned retained message on topic {}", topic);
        }
    }

    /// Remove every expiring message whose expiry is at or before `now`.
    /// Returns the number of messages removed.
    pub fn clean_expired(&self, now: Instant) -> usize {
        let mut cleaned = 0;

        for message in self.list_expirable() {
            if !message.is_expired_at(now) {
                continue;
            }

            // Only remove the entry if it hasn't been replaced in the meantime.
            let removed =
                self.expiring.remove_if(message.topic(), |_, current| current.is_expired_at(now));

            if removed.is_some() {
                cleaned += 1;
            }
        }

        if cleaned > 0 {
            info!("Cleaned {} expired retained messages", cleaned);
        }

        cleaned
    }

    pub fn is_empty(&self) -> bool {
        self.permanent.is_empty() && self.expiring.is_empty()
    }

    pub fn len(&self) -> usize {
        self.permanent.len() + self.expiring.len()
    }

    /// Get the retained messages which match a given topic filter.
    pub fn query(&self, topic_filter: &TopicFilter) -> Vec<RetainedMessage> {
        let mut retained_messages = Vec::new();

        match topic_filter {
            TopicFilter::Concrete { filter, .. } | TopicFilter::SharedConcrete { filter, .. } => {
                // A filter without wildcards can only match the topic with the same name.
                if let Ok(topic) = filter.parse::<Topic>() {
                    for storage in &[&self.permanent, &self.expiring] {
                        if let Some(message) = storage.get(&topic) {
                            retained_messages.push(message.value().clone());
                        }
                    }
                }
            },
            TopicFilter::Wildcard { .. } | TopicFilter::SharedWildcard { .. } => {
                find_matching(topic_filter, &self.permanent, &mut retained_messages);
                find_matching(topic_filter, &self.expiring, &mut retained_messages);
            },
        }

        trace!("Found {} retained messages for filter {}", retained_messages.len(), topic_filter);

        retained_messages
    }

    /// Every message stored with an expiry, whether or not it has expired yet.
    pub fn list_expirable(&self) -> Vec<RetainedMessage> {
        self.expiring.iter().map(|entry| entry.value().clone()).collect()
    }
}

fn find_matching(
    topic_filter: &TopicFilter,
    storage: &DashMap<Topic, RetainedMessage>,
    retained_messages: &mut Vec<RetainedMessage>,
) {
    for entry in storage.iter() {
        if topic_filter.matches_topic(entry.key()) {
            retained_messages.push(entry.value().clone());
        }
    }
}
