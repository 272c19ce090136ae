#![no_main]
use libfuzzer_sys::fuzz_target;
use mqtt_v5::topic::TopicFilter;

// A valid filter, shared or not, prints back to the same filter.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(filter) = s.parse::<TopicFilter>() {
            assert_eq!(filter.to_string(), s);
            assert_eq!(filter.to_string().parse::<TopicFilter>(), Ok(filter));
        }
    }
});
