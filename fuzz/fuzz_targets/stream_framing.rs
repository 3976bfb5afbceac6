#![no_main]

use ash_rpc_engine::{Framing, JsonRpcChannel, StreamChannel};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;
use std::io::Cursor;

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    content_length: bool,
    max_message_size: u16,
    stream: Vec<u8>,
}

fuzz_target!(|input: FuzzInput| {
    let framing = if input.content_length {
        Framing::ContentLength
    } else {
        Framing::Newline
    };
    let mut channel = StreamChannel::builder(Cursor::new(input.stream), Vec::new())
        .framing(framing)
        .max_message_size(input.max_message_size.into())
        .build();

    // Parse errors leave the stream usable; anything else ends it
    for _ in 0..64 {
        match channel.receive() {
            Ok(Some(_)) => {}
            Err(e) if e.is_recoverable() => {}
            Ok(None) | Err(_) => break,
        }
    }
});
