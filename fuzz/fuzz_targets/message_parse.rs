#![no_main]

use ash_rpc_engine::{JsonCodec, Message};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(message) = Message::decode(text) {
        // A decoded message re-encodes to JSON that decodes to the same message
        let encoded = message.to_json();
        let decoded = Message::from_json(&encoded).expect("re-decoding an encoded message");
        assert_eq!(decoded, message);
    }
});
