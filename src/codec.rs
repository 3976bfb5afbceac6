//! Typed codec layer between domain values and JSON values.
//!
//! Decoding is strict: a codec never coerces between kinds and never truncates numbers.
//! The `Display` text of [`CodecError`] is sent verbatim to peers in `InvalidRequest`
//! replies, so the message formats below are part of the wire contract.

pub mod primitives;

pub use primitives::NonEmpty;

use crate::kind::{Kind, kind_of};
use serde_json::{Map, Value};
use std::fmt;

/// JSON object type used by the codecs
pub type JsonObject = Map<String, Value>;

/// Bidirectional mapping between a value and its JSON representation
pub trait JsonCodec: Sized {
    /// Encode the value. Encoding never fails.
    fn to_json(&self) -> Value;

    /// Decode a value, reporting the first violation encountered
    fn from_json(json: &Value) -> Result<Self, CodecError>;
}

/// Errors raised while decoding a JSON value
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("Unsupported kind type '{0}'")]
    UnsupportedKindType(Kind),

    #[error("Unsupported kind property value '{0}'")]
    UnsupportedKindValue(String),

    #[error("The value '{0}' is out of range")]
    OutOfRange(String),

    #[error("Missing {0}")]
    MissingKey(KeyList),

    #[error("The array is empty")]
    EmptyArray,

    #[error("Conflicting '{0}' and '{1}' keys")]
    ConflictingKeys(String, String),

    #[error("Unsupported jsonrpc version '{0}'")]
    UnsupportedVersion(String),
}

/// One or more object keys, any of which would have satisfied a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyList(Vec<String>);

impl KeyList {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(keys.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for KeyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let [only] = self.0.as_slice() {
            return write!(f, "'{}'", only);
        }

        let last = self.0.len().saturating_sub(1);
        for (index, key) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            if index == last {
                write!(f, "or '{}'", key)?;
            } else {
                write!(f, "'{}'", key)?;
            }
        }
        Ok(())
    }
}

/// Error for a value whose kind the codec does not accept
pub fn unsupported_kind_type(json: &Value) -> CodecError {
    CodecError::UnsupportedKindType(kind_of(json))
}

/// Error for a numeric value outside the codec's bounds
pub fn value_out_of_range(literal: impl fmt::Display) -> CodecError {
    CodecError::OutOfRange(literal.to_string())
}

/// Error for a single required key
pub fn missing_key(key: &str) -> CodecError {
    CodecError::MissingKey(KeyList::new([key]))
}

/// Error for a lookup where any one of several keys was required
pub fn missing_keys(keys: &[&str]) -> CodecError {
    CodecError::MissingKey(KeyList::new(keys.iter().copied()))
}

/// Error for an object whose `kind` discriminator names an unsupported variant.
///
/// A missing or non-string `kind` reports that problem instead.
pub fn unsupported_kind_value(object: &JsonObject) -> CodecError {
    match kind_property(object) {
        Ok(kind) => CodecError::UnsupportedKindValue(kind),
        Err(e) => e,
    }
}

/// Require an object
pub fn as_object(json: &Value) -> Result<&JsonObject, CodecError> {
    json.as_object().ok_or_else(|| unsupported_kind_type(json))
}

/// Decode a required key
pub fn required<T: JsonCodec>(object: &JsonObject, key: &str) -> Result<T, CodecError> {
    match object.get(key) {
        Some(value) => T::from_json(value),
        None => Err(missing_key(key)),
    }
}

/// Decode an optional key; an absent key is `None`
pub fn optional<T: JsonCodec>(object: &JsonObject, key: &str) -> Result<Option<T>, CodecError> {
    object.get(key).map(T::from_json).transpose()
}

/// Read the `kind` discriminator of a tagged object
pub fn kind_property(object: &JsonObject) -> Result<String, CodecError> {
    required::<String>(object, "kind")
}
