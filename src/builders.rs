//! Builder patterns for JSON-RPC messages.

use crate::types::*;
use serde_json::Value;

/// Builder for JSON-RPC requests
pub struct RequestBuilder {
    method: String,
    params: Option<Value>,
    id: Option<Identifier>,
}

impl RequestBuilder {
    /// Create a new request builder
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
            id: None,
        }
    }

    /// Set request parameters (an array or an object)
    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    /// Set request ID
    pub fn id(mut self, id: impl Into<Identifier>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Build the request. Without an explicit ID a unique string ID is generated.
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            id: self.id.unwrap_or_else(Identifier::unique),
            params: self.params,
        }
    }
}

/// Builder for JSON-RPC responses
pub struct ResponseBuilder {
    result: Option<Value>,
    error: Option<ErrorObject>,
    id: Option<Identifier>,
}

impl ResponseBuilder {
    /// Create a new response builder
    pub fn new() -> Self {
        Self {
            result: None,
            error: None,
            id: None,
        }
    }

    /// Set successful result
    pub fn success(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Set error; an error takes precedence over any result
    pub fn error(mut self, error: ErrorObject) -> Self {
        self.error = Some(error);
        self
    }

    /// Set response ID
    pub fn id(mut self, id: Option<Identifier>) -> Self {
        self.id = id;
        self
    }

    /// Build the response. A response with neither result nor error carries a null result.
    pub fn build(self) -> Response {
        match self.error {
            Some(error) => Response::error(error, self.id),
            None => Response::success(self.result.unwrap_or(Value::Null), self.id),
        }
    }
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for JSON-RPC notifications
pub struct NotificationBuilder {
    method: String,
    params: Option<Value>,
}

impl NotificationBuilder {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn build(self) -> Notification {
        Notification {
            method: self.method,
            params: self.params,
        }
    }
}

/// Builder for JSON-RPC error objects
pub struct ErrorBuilder {
    code: ErrorCode,
    message: String,
    data: Option<Value>,
}

impl ErrorBuilder {
    /// Create a new error builder
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Add additional error data
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Build the error
    pub fn build(self) -> ErrorObject {
        ErrorObject {
            code: self.code,
            message: self.message,
            data: self.data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::JsonCodec;
    use serde_json::json;

    #[test]
    fn test_request_builder() {
        let request = RequestBuilder::new("subtract")
            .params(json!([42, 23]))
            .id(1)
            .build();
        assert_eq!(request.method(), "subtract");
        assert_eq!(request.id(), &Identifier::Integer(1));
        assert_eq!(request.params(), Some(&json!([42, 23])));
    }

    #[test]
    fn test_request_builder_generates_id() {
        let first = RequestBuilder::new("ping").build();
        let second = RequestBuilder::new("ping").build();
        assert!(first.id().as_str().is_some());
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_response_builder_error_wins() {
        let response = ResponseBuilder::new()
            .success(json!(1))
            .error(ErrorObject::internal_error("boom"))
            .id(Some(Identifier::from(3)))
            .build();
        assert!(response.is_error());
        assert_eq!(response.error_info().unwrap().message(), "boom");
        assert_eq!(response.id(), Some(&Identifier::Integer(3)));
    }

    #[test]
    fn test_response_builder_defaults_to_null_result() {
        let response = ResponseBuilder::default().build();
        assert_eq!(response.result(), Some(&Value::Null));
        assert_eq!(
            response.to_json().to_string(),
            r#"{"jsonrpc":"2.0","id":null,"result":null}"#
        );
    }

    #[test]
    fn test_notification_builder() {
        let notification = NotificationBuilder::new("update")
            .params(json!({"status": "ready"}))
            .build();
        assert_eq!(notification.method(), "update");
        assert_eq!(notification.params(), Some(&json!({"status": "ready"})));
    }

    #[test]
    fn test_error_builder() {
        let error = ErrorBuilder::new(error_codes::INVALID_PARAMS, "Invalid params")
            .data(json!({"expected": "array"}))
            .build();
        assert_eq!(error.code(), ErrorCode::INVALID_PARAMS);
        assert_eq!(error.data(), Some(&json!({"expected": "array"})));

        let custom = ErrorBuilder::new(ErrorCode::new(-32050), "Server busy").build();
        assert!(custom.is_server_error());
    }
}
