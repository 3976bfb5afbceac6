#![no_main]

use ash_rpc_engine::{Batch, JsonCodec};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    if let Ok(batch) = Batch::from_json(&json) {
        assert!(!batch.messages().is_empty());
        assert_eq!(Batch::from_json(&batch.to_json()).ok(), Some(batch));
    }
});
