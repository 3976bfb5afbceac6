#![no_main]

use ash_rpc_engine::{ErrorBuilder, Identifier, JsonCodec, Response, ResponseBuilder};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
enum FuzzId {
    Null,
    Integer(i64),
    String(String),
}

#[derive(Arbitrary, Debug)]
struct FuzzInput {
    result_raw: Vec<u8>,
    error_code: i32,
    error_message: String,
    error_data_raw: Vec<u8>,
    id: FuzzId,
    use_result: bool,
    use_error: bool,
    use_error_data: bool,
}

fuzz_target!(|input: FuzzInput| {
    let mut builder = ResponseBuilder::new();

    if input.use_result {
        if let Ok(result) = serde_json::from_slice::<serde_json::Value>(&input.result_raw) {
            builder = builder.success(result);
        }
    }

    if input.use_error {
        let mut error = ErrorBuilder::new(input.error_code, input.error_message);
        if input.use_error_data {
            if let Ok(data) = serde_json::from_slice::<serde_json::Value>(&input.error_data_raw) {
                error = error.data(data);
            }
        }
        builder = builder.error(error.build());
    }

    let id = match input.id {
        FuzzId::Null => None,
        FuzzId::Integer(n) => Some(Identifier::Integer(n)),
        FuzzId::String(s) => Some(Identifier::String(s)),
    };
    let response = builder.id(id).build();

    assert_ne!(response.is_success(), response.is_error());
    let decoded = Response::from_json(&response.to_json()).expect("decoding a built response");
    assert_eq!(decoded, response);
});
