use crate::{
    MAX_TOPIC_LEN_BYTES, MULTI_LEVEL_WILDCARD, MULTI_LEVEL_WILDCARD_STR,
    SHARED_SUBSCRIPTION_PREFIX, SINGLE_LEVEL_WILDCARD, SINGLE_LEVEL_WILDCARD_STR, TOPIC_SEPARATOR,
};
use std::{fmt, str::FromStr};

/// A filter for subscribers to indicate which topics they want
/// to receive messages from. Can contain wildcards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopicFilter {
    Concrete { filter: String, level_count: u32 },
    Wildcard { filter: String, level_count: u32 },
    SharedConcrete { group_name: String, filter: String, level_count: u32 },
    SharedWildcard { group_name: String, filter: String, level_count: u32 },
}

/// A topic name publishers use when sending MQTT messages.
/// Cannot contain wildcards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Topic {
    topic_name: String,
    level_count: u32,
}

#[derive(Debug, PartialEq)]
pub enum TopicLevel<'a> {
    Concrete(&'a str),
    SingleLevelWildcard,
    MultiLevelWildcard,
}

#[derive(Debug, PartialEq)]
pub enum TopicParseError {
    EmptyTopic,
    TopicTooLong,
    MultilevelWildcardNotAtEnd,
    InvalidWildcardLevel,
    InvalidSharedGroupName,
    EmptySharedGroupName,
    WildcardOrNullInTopic,
}

/// If Ok, returns (level_count, contains_wildcards).
fn process_filter(filter: &str) -> Result<(u32, bool), TopicParseError> {
    let mut level_count = 0;
    let mut contains_wildcards = false;
    for level in filter.split(TOPIC_SEPARATOR) {
        let level_contains_wildcard =
            level.contains(|x: char| x == SINGLE_LEVEL_WILDCARD || x == MULTI_LEVEL_WILDCARD);
        if level_contains_wildcard {
            // Any wildcards on a particular level must be specified on their own
            if level.len() > 1 {
                return Err(TopicParseError::InvalidWildcardLevel);
            }

            contains_wildcards = true;
        }

        level_count += 1;
    }

    Ok((level_count, contains_wildcards))
}

impl FromStr for TopicFilter {
    type Err = TopicParseError;

    fn from_str(filter: &str) -> Result<Self, Self::Err> {
        // Filters and topics cannot be empty
        if filter.is_empty() {
            return Err(TopicParseError::EmptyTopic);
        }

        if filter.contains('\0') {
            return Err(TopicParseError::WildcardOrNullInTopic);
        }

        // Filters cannot exceed the byte length in the MQTT spec
        if filter.len() > MAX_TOPIC_LEN_BYTES {
            return Err(TopicParseError::TopicTooLong);
        }

        // Multi-level wildcards can only be at the end of the topic
        if let Some(pos) = filter.rfind(MULTI_LEVEL_WILDCARD) {
            if pos != filter.len() - 1 {
                return Err(TopicParseError::MultilevelWildcardNotAtEnd);
            }
        }

        let mut shared_group = None;

        if filter.starts_with(SHARED_SUBSCRIPTION_PREFIX) {
            let filter_rest = &filter[SHARED_SUBSCRIPTION_PREFIX.len()..];

            if filter_rest.is_empty() {
                return Err(TopicParseError::EmptySharedGroupName);
            }

            if let Some(slash_pos) = filter_rest.find(TOPIC_SEPARATOR) {
                let shared_name = &filter_rest[0..slash_pos];

                // slash_pos+1 is safe here, we've already validated the string
                // has a nonzero length.
                let shared_filter = &filter_rest[(slash_pos + 1)..];

                if shared_name.is_empty() {
                    return Err(TopicParseError::EmptySharedGroupName);
                }

                if shared_name
                    .contains(|x: char| x == SINGLE_LEVEL_WILDCARD || x == MULTI_LEVEL_WILDCARD)
                {
                    return Err(TopicParseError::InvalidSharedGroupName);
                }

                if shared_filter.is_empty() {
                    return Err(TopicParseError::EmptyTopic);
                }

                shared_group = Some((shared_name, shared_filter))
            } else {
                return Err(TopicParseError::EmptyTopic);
            }
        }

        let topic_filter = if let Some((group_name, shared_filter)) = shared_group {
            let (level_count, contains_wildcards) = process_filter(shared_filter)?;

            if contains_wildcards {
                TopicFilter::SharedWildcard {
                    group_name: group_name.to_string(),
                    filter: shared_filter.to_string(),
                    level_count,
                }
            } else {
                TopicFilter::SharedConcrete {
                    group_name: group_name.to_string(),
                    filter: shared_filter.to_string(),
                    level_count,
                }
            }
        } else {
            let (level_count, contains_wildcards) = process_filter(filter)?;

            if contains_wildcards {
                TopicFilter::Wildcard { filter: filter.to_string(), level_count }
            } else {
                TopicFilter::Concrete { filter: filter.to_string(), level_count }
            }
        };

        Ok(topic_filter)
    }
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(topic: &str) -> Result<Self, Self::Err> {
        // TODO - Consider disallowing leading $ characters

        // Topics cannot be empty
        if topic.is_empty() {
            return Err(TopicParseError::EmptyTopic);
        }

        // Topics cannot exceed the byte length in the MQTT spec
        if topic.len() > MAX_TOPIC_LEN_BYTES {
            return Err(TopicParseError::TopicTooLong);
        }

        // Topics cannot contain wildcards or null characters
        if topic.contains(|x: char| {
            x == SINGLE_LEVEL_WILDCARD || x == MULTI_LEVEL_WILDCARD || x == '\0'
        }) {
            return Err(TopicParseError::WildcardOrNullInTopic);
        }

        let level_count = topic.split(TOPIC_SEPARATOR).count() as u32;

        let topic = Topic { topic_name: topic.to_string(), level_count };

        Ok(topic)
    }
}

pub struct TopicLevels<'a> {
    levels_iter: std::str::Split<'a, char>,
}

impl<'a> TopicFilter {
    /// The filter string used for matching. For shared subscriptions
    /// this excludes the `$share/<group_name>/` prefix.
    pub fn filter(&'a self) -> &'a str {
        match self {
            TopicFilter::Concrete { filter, .. } => filter,
            TopicFilter::Wildcard { filter, .. } => filter,
            TopicFilter::SharedConcrete { filter, .. } => filter,
            TopicFilter::SharedWildcard { filter, .. } => filter,
        }
    }

    pub fn level_count(&self) -> u32 {
        match self {
            TopicFilter::Concrete { level_count, .. } => *level_count,
            TopicFilter::Wildcard { level_count, .. } => *level_count,
            TopicFilter::SharedConcrete { level_count, .. } => *level_count,
            TopicFilter::SharedWildcard { level_count, .. } => *level_count,
        }
    }

    pub fn levels(&'a self) -> TopicLevels<'a> {
        TopicLevels { levels_iter: self.filter().split(TOPIC_SEPARATOR) }
    }

    fn ends_with_multi_level_wildcard(&self) -> bool {
        self.filter().ends_with(MULTI_LEVEL_WILDCARD)
    }

    /// Returns true if `topic` is one of the topics this filter selects.
    ///
    /// `+` consumes exactly one level of the topic, including an empty one.
    /// A trailing `#` consumes all remaining levels, or none at all, so
    /// `sport/tennis/#` also matches `sport/tennis`.
    pub fn matches_topic(&self, topic: &Topic) -> bool {
        let filter_level_count = self.level_count();

        if self.ends_with_multi_level_wildcard() {
            if topic.level_count() + 1 < filter_level_count {
                return false;
            }
        } else if topic.level_count() != filter_level_count {
            return false;
        }

        let mut topic_levels = topic.levels();

        for filter_level in self.levels() {
            match filter_level {
                TopicLevel::MultiLevelWildcard => return true,
                TopicLevel::SingleLevelWildcard => {
                    if topic_levels.next().is_none() {
                        return false;
                    }
                },
                TopicLevel::Concrete(filter_level) => match topic_levels.next() {
                    Some(TopicLevel::Concrete(topic_level)) if topic_level == filter_level => {},
                    _ => return false,
                },
            }
        }

        topic_levels.next().is_none()
    }
}

impl<'a> Topic {
    pub fn levels(&'a self) -> TopicLevels<'a> {
        TopicLevels { levels_iter: self.topic_name.split(TOPIC_SEPARATOR) }
    }

    pub fn level_count(&self) -> u32 {
        self.level_count
    }

    pub fn as_str(&'a self) -> &'a str {
        &self.topic_name
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.topic_name)
    }
}

impl fmt::Display for TopicFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicFilter::SharedConcrete { group_name, filter, .. }
            | TopicFilter::SharedWildcard { group_name, filter, .. } => {
                write!(f, "{}{}/{}", SHARED_SUBSCRIPTION_PREFIX, group_name, filter)
            },
            TopicFilter::Concrete { filter, .. } | TopicFilter::Wildcard { filter, .. } => {
                f.write_str(filter)
            },
        }
    }
}

impl<'a> Iterator for TopicLevels<'a> {
    type Item = TopicLevel<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.levels_iter.next() {
            Some(MULTI_LEVEL_WILDCARD_STR) => Some(TopicLevel::MultiLevelWildcard),
            Some(SINGLE_LEVEL_WILDCARD_STR) => Some(TopicLevel::SingleLevelWildcard),
            Some(level) => Some(TopicLevel::Concrete(level)),
            None => None,
        }
    }
}
