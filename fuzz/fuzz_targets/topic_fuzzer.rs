#![no_main]
use libfuzzer_sys::fuzz_target;
use mqtt_v5::topic::Topic;

// A valid topic prints back to the same topic.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(topic) = s.parse::<Topic>() {
            assert_eq!(topic.to_string(), s);
            assert_eq!(topic.to_string().parse::<Topic>(), Ok(topic));
        }
    }
});
