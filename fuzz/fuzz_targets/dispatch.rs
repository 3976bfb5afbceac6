#![no_main]

use ash_rpc_engine::{HandlerError, JsonRpcChannelExt, MemoryChannel};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut channel = MemoryChannel::new();
    channel.push_text(text);

    let result = channel.json_rpc(|message, _| {
        if message.method() == Some("fail") {
            return Err(HandlerError::new("fail"));
        }
        Ok(())
    });

    // Nothing read from a memory channel is a transport fault
    assert!(result.is_ok());
    for reply in channel.sent() {
        assert_eq!(reply.get("jsonrpc"), Some(&serde_json::json!("2.0")));
    }
});
