#![no_main]
use libfuzzer_sys::fuzz_target;
use mqtt_v5::topic::{Topic, TopicFilter};

// Input is "<filter>\n<topic>"
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        let mut parts = s.splitn(2, '\n');

        if let (Some(filter), Some(topic)) = (parts.next(), parts.next()) {
            let filter = filter.parse::<TopicFilter>();
            let topic = topic.parse::<Topic>();

            if let (Ok(filter), Ok(topic)) = (filter, topic) {
                let _ = filter.matches_topic(&topic);
            }
        }
    }
});
