//! Core JSON-RPC 2.0 types and data structures.
//!
//! Decoding goes through the [`JsonCodec`] layer so every schema violation carries the
//! exact text that is echoed back to peers. Encoding emits keys in a fixed order with
//! `jsonrpc` first.

use crate::codec::{
    self, CodecError, JsonCodec, JsonObject, NonEmpty, unsupported_kind_type, value_out_of_range,
};
use crate::kind::{Kind, kind_of};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Protocol version emitted on every message
pub const JSONRPC_VERSION: &str = "2.0";

/// Standard JSON-RPC 2.0 error codes.
///
/// # Example
/// ```rust
/// use ash_rpc_engine::{ErrorBuilder, error_codes};
///
/// let error = ErrorBuilder::new(error_codes::METHOD_NOT_FOUND, "Method not found")
///     .build();
/// assert!(error.is_method_not_found());
/// ```
pub mod error_codes {
    /// Parse error - Invalid JSON was received.
    pub const PARSE_ERROR: i32 = -32700;

    /// Invalid Request - The JSON sent is not a valid Request object.
    pub const INVALID_REQUEST: i32 = -32600;

    /// Method not found - The method does not exist / is not available.
    pub const METHOD_NOT_FOUND: i32 = -32601;

    /// Invalid params - Invalid method parameter(s).
    pub const INVALID_PARAMS: i32 = -32602;

    /// Internal error - Internal JSON-RPC error.
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Lowest code of the implementation-defined server error range.
    pub const SERVER_ERROR_RANGE_START: i32 = -32099;

    /// Highest code of the implementation-defined server error range.
    pub const SERVER_ERROR_RANGE_END: i32 = -32000;
}

/// Request identifier - an integer or a string
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    Integer(i64),
    String(String),
}

impl Identifier {
    /// Generate a random string identifier
    pub fn unique() -> Self {
        Identifier::String(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Identifier::Integer(value) => Some(*value),
            Identifier::String(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Identifier::String(value) => Some(value),
            Identifier::Integer(_) => None,
        }
    }
}

impl From<i64> for Identifier {
    fn from(value: i64) -> Self {
        Identifier::Integer(value)
    }
}

impl From<i32> for Identifier {
    fn from(value: i32) -> Self {
        Identifier::Integer(value.into())
    }
}

impl From<u32> for Identifier {
    fn from(value: u32) -> Self {
        Identifier::Integer(value.into())
    }
}

impl From<&str> for Identifier {
    fn from(value: &str) -> Self {
        Identifier::String(value.to_owned())
    }
}

impl From<String> for Identifier {
    fn from(value: String) -> Self {
        Identifier::String(value)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identifier::Integer(value) => write!(f, "{}", value),
            Identifier::String(value) => f.write_str(value),
        }
    }
}

impl JsonCodec for Identifier {
    fn to_json(&self) -> Value {
        match self {
            Identifier::Integer(value) => Value::from(*value),
            Identifier::String(value) => Value::String(value.clone()),
        }
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        match (kind_of(json), json) {
            (Kind::Integer, Value::Number(n)) => n
                .as_i64()
                .map(Identifier::Integer)
                .ok_or_else(|| value_out_of_range(n)),
            (Kind::String, Value::String(s)) => Ok(Identifier::String(s.clone())),
            _ => Err(unsupported_kind_type(json)),
        }
    }
}

/// JSON-RPC 2.0 error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    pub const PARSE_ERROR: ErrorCode = ErrorCode(error_codes::PARSE_ERROR);
    pub const INVALID_REQUEST: ErrorCode = ErrorCode(error_codes::INVALID_REQUEST);
    pub const METHOD_NOT_FOUND: ErrorCode = ErrorCode(error_codes::METHOD_NOT_FOUND);
    pub const INVALID_PARAMS: ErrorCode = ErrorCode(error_codes::INVALID_PARAMS);
    pub const INTERNAL_ERROR: ErrorCode = ErrorCode(error_codes::INTERNAL_ERROR);
    pub const SERVER_ERROR_RANGE_START: ErrorCode =
        ErrorCode(error_codes::SERVER_ERROR_RANGE_START);
    pub const SERVER_ERROR_RANGE_END: ErrorCode = ErrorCode(error_codes::SERVER_ERROR_RANGE_END);

    pub const fn new(code: i32) -> Self {
        Self(code)
    }

    pub const fn code(self) -> i32 {
        self.0
    }

    /// Check if the code lies in the implementation-defined server error range
    pub fn is_server_error(self) -> bool {
        (error_codes::SERVER_ERROR_RANGE_START..=error_codes::SERVER_ERROR_RANGE_END)
            .contains(&self.0)
    }

    /// Check if the code lies in the range reserved by JSON-RPC (-32768 to -32000)
    pub fn is_reserved(self) -> bool {
        (-32768..=-32000).contains(&self.0)
    }

    /// Standard message for the predefined codes
    pub fn default_message(self) -> Option<&'static str> {
        match self.0 {
            error_codes::PARSE_ERROR => Some("Parse error"),
            error_codes::INVALID_REQUEST => Some("Invalid Request"),
            error_codes::METHOD_NOT_FOUND => Some("Method not found"),
            error_codes::INVALID_PARAMS => Some("Invalid params"),
            error_codes::INTERNAL_ERROR => Some("Internal error"),
            _ if self.is_server_error() => Some("Server error"),
            _ => None,
        }
    }
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl From<ErrorCode> for i32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl JsonCodec for ErrorCode {
    fn to_json(&self) -> Value {
        Value::from(self.0)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        i32::from_json(json).map(ErrorCode)
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorObject {
    pub code: ErrorCode,
    pub message: String,
    pub data: Option<Value>,
}

impl ErrorObject {
    /// Create a new error
    pub fn new(code: impl Into<ErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// Add additional data to the error
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn parse_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PARSE_ERROR, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_REQUEST, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::METHOD_NOT_FOUND,
            format!("Method '{}' not found.", method),
        )
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INVALID_PARAMS, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::INTERNAL_ERROR, message)
    }

    /// Check if this is a parse error (-32700)
    pub fn is_parse_error(&self) -> bool {
        self.code == ErrorCode::PARSE_ERROR
    }

    /// Check if this is an invalid request error (-32600)
    pub fn is_invalid_request(&self) -> bool {
        self.code == ErrorCode::INVALID_REQUEST
    }

    /// Check if this is a method not found error (-32601)
    pub fn is_method_not_found(&self) -> bool {
        self.code == ErrorCode::METHOD_NOT_FOUND
    }

    pub fn is_invalid_params(&self) -> bool {
        self.code == ErrorCode::INVALID_PARAMS
    }

    pub fn is_internal_error(&self) -> bool {
        self.code == ErrorCode::INTERNAL_ERROR
    }

    pub fn is_server_error(&self) -> bool {
        self.code.is_server_error()
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }
}

impl fmt::Display for ErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)
    }
}

impl std::error::Error for ErrorObject {}

impl JsonCodec for ErrorObject {
    fn to_json(&self) -> Value {
        let mut object = JsonObject::new();
        object.insert("code".into(), self.code.to_json());
        object.insert("message".into(), Value::String(self.message.clone()));
        if let Some(data) = &self.data {
            object.insert("data".into(), data.clone());
        }
        Value::Object(object)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let object = codec::as_object(json)?;
        Ok(Self {
            code: codec::required(object, "code")?,
            message: codec::required(object, "message")?,
            data: codec::optional(object, "data")?,
        })
    }
}

/// JSON-RPC 2.0 request message
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: String,
    pub id: Identifier,
    pub params: Option<Value>,
}

impl Request {
    /// Create a new JSON-RPC request
    pub fn new(method: impl Into<String>, id: impl Into<Identifier>) -> Self {
        Self {
            method: method.into(),
            id: id.into(),
            params: None,
        }
    }

    /// Add parameters to the request
    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn jsonrpc(&self) -> &'static str {
        JSONRPC_VERSION
    }

    /// Get the method name
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Get a reference to the parameters
    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    /// Take ownership of the parameters
    pub fn take_params(self) -> Option<Value> {
        self.params
    }

    /// Get a reference to the request ID
    pub fn id(&self) -> &Identifier {
        &self.id
    }
}

impl JsonCodec for Request {
    fn to_json(&self) -> Value {
        let mut object = versioned();
        object.insert("method".into(), Value::String(self.method.clone()));
        object.insert("id".into(), self.id.to_json());
        insert_params(&mut object, self.params.as_ref());
        Value::Object(object)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let object = codec::as_object(json)?;
        let id = codec::required(object, "id")?;
        let method = codec::required(object, "method")?;
        let params = decode_params(object)?;
        decode_version(object)?;
        Ok(Self { method, id, params })
    }
}

/// JSON-RPC 2.0 notification message (no response expected)
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub method: String,
    pub params: Option<Value>,
}

impl Notification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = Some(params);
        self
    }

    pub fn jsonrpc(&self) -> &'static str {
        JSONRPC_VERSION
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> Option<&Value> {
        self.params.as_ref()
    }

    pub fn take_params(self) -> Option<Value> {
        self.params
    }
}

impl JsonCodec for Notification {
    fn to_json(&self) -> Value {
        let mut object = versioned();
        object.insert("method".into(), Value::String(self.method.clone()));
        insert_params(&mut object, self.params.as_ref());
        Value::Object(object)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let object = codec::as_object(json)?;
        let method = codec::required(object, "method")?;
        let params = decode_params(object)?;
        decode_version(object)?;
        Ok(Self { method, params })
    }
}

/// JSON-RPC 2.0 response message.
///
/// A response carries either a result or an error, never both.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub id: Option<Identifier>,
    pub outcome: Result<Value, ErrorObject>,
}

impl Response {
    /// Create a successful response
    pub fn success(result: Value, id: Option<Identifier>) -> Self {
        Self {
            id,
            outcome: Ok(result),
        }
    }

    /// Create an error response
    pub fn error(error: ErrorObject, id: Option<Identifier>) -> Self {
        Self {
            id,
            outcome: Err(error),
        }
    }

    pub fn jsonrpc(&self) -> &'static str {
        JSONRPC_VERSION
    }

    /// Check if this is a successful response
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Check if this is an error response
    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Get a reference to the result
    pub fn result(&self) -> Option<&Value> {
        self.outcome.as_ref().ok()
    }

    /// Get error information
    pub fn error_info(&self) -> Option<&ErrorObject> {
        self.outcome.as_ref().err()
    }

    /// Take ownership of the result
    pub fn take_result(self) -> Option<Value> {
        self.outcome.ok()
    }

    /// Take ownership of the error
    pub fn take_error(self) -> Option<ErrorObject> {
        self.outcome.err()
    }

    /// Get the response ID; `None` when the peer answered with a null id
    pub fn id(&self) -> Option<&Identifier> {
        self.id.as_ref()
    }
}

impl JsonCodec for Response {
    fn to_json(&self) -> Value {
        let mut object = versioned();
        object.insert("id".into(), self.id.to_json());
        match &self.outcome {
            Ok(result) => object.insert("result".into(), result.clone()),
            Err(error) => object.insert("error".into(), error.to_json()),
        };
        Value::Object(object)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let object = codec::as_object(json)?;
        let id = codec::required(object, "id")?;
        let outcome = match (object.get("result"), object.get("error")) {
            (Some(result), None) => Ok(result.clone()),
            (None, Some(error)) => Err(ErrorObject::from_json(error)?),
            (Some(_), Some(_)) => {
                return Err(CodecError::ConflictingKeys(
                    "result".into(),
                    "error".into(),
                ));
            }
            (None, None) => return Err(codec::missing_keys(&["result", "error"])),
        };
        decode_version(object)?;
        Ok(Self { id, outcome })
    }
}

/// Any JSON-RPC 2.0 message
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Request(Request),
    Response(Response),
    Notification(Notification),
}

impl Message {
    /// Decode a message from JSON text
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        let json: Value = serde_json::from_str(text)?;
        Ok(Self::from_json(&json)?)
    }

    /// Encode the message as compact JSON text
    pub fn encode(&self) -> String {
        self.to_json().to_string()
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Message::Request(_))
    }

    pub fn is_response(&self) -> bool {
        matches!(self, Message::Response(_))
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Message::Notification(_))
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Message::Request(req) => Some(req),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Message::Response(resp) => Some(resp),
            _ => None,
        }
    }

    pub fn as_notification(&self) -> Option<&Notification> {
        match self {
            Message::Notification(notif) => Some(notif),
            _ => None,
        }
    }

    pub fn into_request(self) -> Option<Request> {
        match self {
            Message::Request(req) => Some(req),
            _ => None,
        }
    }

    pub fn into_response(self) -> Option<Response> {
        match self {
            Message::Response(resp) => Some(resp),
            _ => None,
        }
    }

    pub fn into_notification(self) -> Option<Notification> {
        match self {
            Message::Notification(notif) => Some(notif),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match self {
            Message::Request(req) => Some(&req.method),
            Message::Notification(notif) => Some(&notif.method),
            Message::Response(_) => None,
        }
    }

    pub fn id(&self) -> Option<&Identifier> {
        match self {
            Message::Request(req) => Some(&req.id),
            Message::Response(resp) => resp.id.as_ref(),
            Message::Notification(_) => None,
        }
    }

    /// Run `scope` if this message is a request
    pub fn request<E, F>(&self, scope: F) -> Result<(), E>
    where
        F: FnOnce(&Request) -> Result<(), E>,
    {
        match self {
            Message::Request(req) => scope(req),
            _ => Ok(()),
        }
    }

    /// Run `scope` if this message is a notification
    pub fn notification<E, F>(&self, scope: F) -> Result<(), E>
    where
        F: FnOnce(&Notification) -> Result<(), E>,
    {
        match self {
            Message::Notification(notif) => scope(notif),
            _ => Ok(()),
        }
    }

    /// Run `scope` if this message is a response
    pub fn response<E, F>(&self, scope: F) -> Result<(), E>
    where
        F: FnOnce(&Response) -> Result<(), E>,
    {
        match self {
            Message::Response(resp) => scope(resp),
            _ => Ok(()),
        }
    }
}

impl From<Request> for Message {
    fn from(request: Request) -> Self {
        Message::Request(request)
    }
}

impl From<Response> for Message {
    fn from(response: Response) -> Self {
        Message::Response(response)
    }
}

impl From<Notification> for Message {
    fn from(notification: Notification) -> Self {
        Message::Notification(notification)
    }
}

impl FromStr for Message {
    type Err = DecodeError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::decode(text)
    }
}

impl JsonCodec for Message {
    fn to_json(&self) -> Value {
        match self {
            Message::Request(req) => req.to_json(),
            Message::Response(resp) => resp.to_json(),
            Message::Notification(notif) => notif.to_json(),
        }
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let object = codec::as_object(json)?;
        if !object.contains_key("id") {
            return Notification::from_json(json).map(Message::Notification);
        }

        if object.contains_key("method") {
            Request::from_json(json).map(Message::Request)
        } else if object.contains_key("result") || object.contains_key("error") {
            Response::from_json(json).map(Message::Response)
        } else {
            Err(codec::missing_keys(&["method", "result", "error"]))
        }
    }
}

/// A batch of messages sent as one JSON array
#[derive(Debug, Clone, PartialEq)]
pub struct Batch(pub Vec<Message>);

impl Batch {
    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.0
    }
}

impl JsonCodec for Batch {
    fn to_json(&self) -> Value {
        self.0.to_json()
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        NonEmpty::<Message>::from_json(json).map(|messages| Batch(messages.into_vec()))
    }
}

/// Failure to turn JSON text into a protocol message
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The text is not JSON at all
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON does not describe a valid message
    #[error("{0}")]
    Invalid(#[from] CodecError),
}

impl DecodeError {
    /// Error code reported to the peer
    pub fn code(&self) -> ErrorCode {
        match self {
            DecodeError::Parse(_) => ErrorCode::PARSE_ERROR,
            DecodeError::Invalid(_) => ErrorCode::INVALID_REQUEST,
        }
    }

    pub fn to_error_object(&self) -> ErrorObject {
        ErrorObject::new(self.code(), self.to_string())
    }

    /// Error reply for the peer. The offending message's id is unknown, so it is null.
    pub fn to_response(&self) -> Response {
        Response::error(self.to_error_object(), None)
    }
}

macro_rules! serde_via_codec {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    self.to_json().serialize(serializer)
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let json = Value::deserialize(deserializer)?;
                    <$ty>::from_json(&json).map_err(serde::de::Error::custom)
                }
            }
        )*
    };
}

serde_via_codec!(
    Identifier,
    ErrorCode,
    ErrorObject,
    Request,
    Notification,
    Response,
    Message,
    Batch,
);

fn versioned() -> JsonObject {
    let mut object = JsonObject::new();
    object.insert("jsonrpc".into(), Value::String(JSONRPC_VERSION.into()));
    object
}

fn insert_params(object: &mut JsonObject, params: Option<&Value>) {
    match params {
        None | Some(Value::Null) => {}
        Some(params) => {
            object.insert("params".into(), params.clone());
        }
    }
}

/// Params must be positional (array) or named (object)
fn decode_params(object: &JsonObject) -> Result<Option<Value>, CodecError> {
    match object.get("params") {
        None => Ok(None),
        Some(params @ (Value::Array(_) | Value::Object(_))) => Ok(Some(params.clone())),
        Some(other) => Err(unsupported_kind_type(other)),
    }
}

/// An absent `jsonrpc` key is accepted; a present one must be the string `"2.0"`.
fn decode_version(object: &JsonObject) -> Result<(), CodecError> {
    match codec::optional::<String>(object, "jsonrpc")? {
        Some(version) if version != JSONRPC_VERSION => {
            Err(CodecError::UnsupportedVersion(version))
        }
        _ => Ok(()),
    }
}
