//! Convenience macros for JSON-RPC message creation.

/// Create a success response with a result value and optional ID
///
/// # Examples:
/// ```ignore
/// // Success with ID
/// rpc_success!(42, Some(Identifier::from(1)))
///
/// // Success with the ID of an incoming request
/// rpc_success!(result, Some(request.id().clone()))
///
/// // Success with a null ID
/// rpc_success!("pong")
/// ```
#[macro_export]
macro_rules! rpc_success {
    ($result:expr, $id:expr) => {
        $crate::ResponseBuilder::new()
            .success(::serde_json::json!($result))
            .id($id)
            .build()
    };
    ($result:expr) => {
        $crate::ResponseBuilder::new()
            .success(::serde_json::json!($result))
            .id(None)
            .build()
    };
}

/// Create an error response with code, message, and optional ID
///
/// # Usage:
/// ```ignore
/// rpc_error!(-32602, "Invalid parameters", Some(Identifier::from(1)))
///
/// // Error with a null ID
/// rpc_error!(error_codes::INVALID_REQUEST, "Invalid Request")
/// ```
#[macro_export]
macro_rules! rpc_error {
    ($code:expr, $message:expr, $id:expr) => {
        $crate::ResponseBuilder::new()
            .error($crate::ErrorBuilder::new($code, $message).build())
            .id($id)
            .build()
    };
    ($code:expr, $message:expr) => {
        $crate::ResponseBuilder::new()
            .error($crate::ErrorBuilder::new($code, $message).build())
            .id(None)
            .build()
    };
}

/// Create an error response with code, message, additional data and optional ID
#[macro_export]
macro_rules! rpc_error_with_data {
    ($code:expr, $message:expr, $data:expr, $id:expr) => {
        $crate::ResponseBuilder::new()
            .error(
                $crate::ErrorBuilder::new($code, $message)
                    .data(::serde_json::json!($data))
                    .build(),
            )
            .id($id)
            .build()
    };
    ($code:expr, $message:expr, $data:expr) => {
        $crate::ResponseBuilder::new()
            .error(
                $crate::ErrorBuilder::new($code, $message)
                    .data(::serde_json::json!($data))
                    .build(),
            )
            .id(None)
            .build()
    };
}

/// Common error response shortcuts using predefined error codes
///
/// # Usage:
/// ```ignore
/// rpc_invalid_params!("Expected array of two numbers", id)
/// rpc_method_not_found!(request.method(), id)
/// rpc_parse_error!("Invalid JSON")
/// rpc_internal_error!("Database connection failed", id)
/// ```
#[macro_export]
macro_rules! rpc_invalid_params {
    ($message:expr, $id:expr) => {
        $crate::rpc_error!($crate::error_codes::INVALID_PARAMS, $message, $id)
    };
    ($message:expr) => {
        $crate::rpc_error!($crate::error_codes::INVALID_PARAMS, $message)
    };
}

#[macro_export]
macro_rules! rpc_method_not_found {
    ($method:expr, $id:expr) => {
        $crate::Response::error($crate::ErrorObject::method_not_found($method), $id)
    };
    ($method:expr) => {
        $crate::Response::error($crate::ErrorObject::method_not_found($method), None)
    };
}

#[macro_export]
macro_rules! rpc_parse_error {
    ($message:expr, $id:expr) => {
        $crate::rpc_error!($crate::error_codes::PARSE_ERROR, $message, $id)
    };
    ($message:expr) => {
        $crate::rpc_error!($crate::error_codes::PARSE_ERROR, $message)
    };
}

#[macro_export]
macro_rules! rpc_internal_error {
    ($message:expr, $id:expr) => {
        $crate::rpc_error!($crate::error_codes::INTERNAL_ERROR, $message, $id)
    };
    ($message:expr) => {
        $crate::rpc_error!($crate::error_codes::INTERNAL_ERROR, $message)
    };
}

/// Create a JSON-RPC request
///
/// # Usage:
/// ```ignore
/// // Request with method, params and ID
/// rpc_request!("add", [5, 3], 1)
///
/// // Request with method and ID (no params)
/// rpc_request!("ping", 2)
///
/// // Request with a generated unique ID
/// rpc_request!("ping")
/// ```
#[macro_export]
macro_rules! rpc_request {
    ($method:expr, $params:expr, $id:expr) => {
        $crate::RequestBuilder::new($method)
            .params(::serde_json::json!($params))
            .id($id)
            .build()
    };
    ($method:expr, $id:expr) => {
        $crate::RequestBuilder::new($method).id($id).build()
    };
    ($method:expr) => {
        $crate::RequestBuilder::new($method).build()
    };
}

/// Create a JSON-RPC notification
///
/// # Usage:
/// ```ignore
/// rpc_notification!("log", {"level": "info", "message": "Hello"})
/// rpc_notification!("ping")
/// ```
#[macro_export]
macro_rules! rpc_notification {
    ($method:expr, $($params:tt)+) => {
        $crate::NotificationBuilder::new($method)
            .params(::serde_json::json!($($params)+))
            .build()
    };
    ($method:expr) => {
        $crate::NotificationBuilder::new($method).build()
    };
}

/// Create a JSON-RPC error object (not a response)
#[macro_export]
macro_rules! rpc_error_obj {
    ($code:expr, $message:expr, $data:expr) => {
        $crate::ErrorBuilder::new($code, $message)
            .data(::serde_json::json!($data))
            .build()
    };
    ($code:expr, $message:expr) => {
        $crate::ErrorBuilder::new($code, $message).build()
    };
}

/// Decode request or notification params into a typed value
///
/// Evaluates to `Result<T, ErrorObject>`; failures become `InvalidParams` errors.
///
/// # Usage:
/// ```ignore
/// let numbers = rpc_params!(request.params() => Vec<i32>)?;
/// let filter = rpc_params!(request.params() => Option<Filter>)?;
/// ```
#[macro_export]
macro_rules! rpc_params {
    ($params:expr => Option<$type:ty>) => {
        match $params {
            Some(p) => ::serde_json::from_value::<$type>(p.clone())
                .map(Some)
                .map_err(|e| $crate::ErrorObject::invalid_params(e.to_string())),
            None => Ok(None),
        }
    };
    ($params:expr => $type:ty) => {
        match $params {
            Some(p) => ::serde_json::from_value::<$type>(p.clone())
                .map_err(|e| $crate::ErrorObject::invalid_params(e.to_string())),
            None => Err($crate::ErrorObject::invalid_params(
                "Missing required parameters",
            )),
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::codec::JsonCodec;
    use crate::{ErrorCode, ErrorObject, Identifier};
    use serde_json::json;

    #[test]
    fn test_rpc_success() {
        let response = rpc_success!(42, Some(Identifier::from(1)));
        assert_eq!(response.result(), Some(&json!(42)));
        assert_eq!(response.id(), Some(&Identifier::Integer(1)));

        let anonymous = rpc_success!("pong");
        assert_eq!(anonymous.id(), None);
    }

    #[test]
    fn test_rpc_error_shortcuts() {
        let invalid = rpc_invalid_params!("Expected array", Some(Identifier::from(2)));
        assert_eq!(invalid.error_info().unwrap().code(), ErrorCode::INVALID_PARAMS);

        let missing = rpc_method_not_found!("foo", Some(Identifier::from(3)));
        assert_eq!(
            missing.error_info().unwrap().message(),
            "Method 'foo' not found."
        );

        let parse = rpc_parse_error!("bad json");
        assert!(parse.error_info().unwrap().is_parse_error());
        assert_eq!(parse.id(), None);

        let internal = rpc_internal_error!("boom", None);
        assert!(internal.error_info().unwrap().is_internal_error());
    }

    #[test]
    fn test_rpc_error_with_data() {
        let response = rpc_error_with_data!(-32602, "Invalid", json!({"expected": "array"}));
        assert_eq!(
            response.to_json().to_string(),
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32602,"message":"Invalid","data":{"expected":"array"}}}"#
        );
    }

    #[test]
    fn test_rpc_request_and_notification() {
        let request = rpc_request!("add", [5, 3], 1);
        assert_eq!(
            request.to_json().to_string(),
            r#"{"jsonrpc":"2.0","method":"add","id":1,"params":[5,3]}"#
        );
        assert_eq!(rpc_request!("ping", "a").id(), &Identifier::from("a"));

        let notification = rpc_notification!("log", {"level": "info"});
        assert_eq!(notification.params(), Some(&json!({"level": "info"})));
        assert_eq!(rpc_notification!("ping").params(), None);
    }

    #[test]
    fn test_rpc_error_obj() {
        let error: ErrorObject = rpc_error_obj!(-32001, "Busy", json!([1]));
        assert_eq!(error.data(), Some(&json!([1])));
    }

    #[test]
    fn test_rpc_params() {
        let params = json!([1, 2, 3]);
        let numbers: Result<Vec<i32>, ErrorObject> = rpc_params!(Some(&params) => Vec<i32>);
        assert_eq!(numbers.unwrap(), vec![1, 2, 3]);

        let wrong = json!({"a": 1});
        let error = rpc_params!(Some(&wrong) => Vec<i32>).unwrap_err();
        assert!(error.is_invalid_params());

        let absent: Option<&serde_json::Value> = None;
        assert_eq!(
            rpc_params!(absent => Vec<i32>).unwrap_err().message(),
            "Missing required parameters"
        );
        type Numbers = Vec<i32>;
        assert_eq!(rpc_params!(absent => Option<Numbers>).unwrap(), None);
    }
}
