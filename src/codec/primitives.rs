//! Codecs for primitive and container values.

use super::{CodecError, JsonCodec, unsupported_kind_type, value_out_of_range};
use crate::kind::{Kind, kind_of};
use serde_json::Value;

/// Unsigned integer in the range 0 to 2^32 - 1
impl JsonCodec for u32 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        match json {
            Value::Number(n) if kind_of(json) == Kind::Integer => n
                .as_u64()
                .and_then(|v| u32::try_from(v).ok())
                .ok_or_else(|| value_out_of_range(n)),
            _ => Err(unsupported_kind_type(json)),
        }
    }
}

/// Signed integer in the range -2^31 to 2^31 - 1
impl JsonCodec for i32 {
    fn to_json(&self) -> Value {
        Value::from(*self)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        match json {
            Value::Number(n) if kind_of(json) == Kind::Integer => n
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| value_out_of_range(n)),
            _ => Err(unsupported_kind_type(json)),
        }
    }
}

impl JsonCodec for bool {
    fn to_json(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        json.as_bool().ok_or_else(|| unsupported_kind_type(json))
    }
}

impl JsonCodec for String {
    fn to_json(&self) -> Value {
        Value::String(self.clone())
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        json.as_str()
            .map(str::to_owned)
            .ok_or_else(|| unsupported_kind_type(json))
    }
}

/// Opaque passthrough
impl JsonCodec for Value {
    fn to_json(&self) -> Value {
        self.clone()
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        Ok(json.clone())
    }
}

/// Nullable value: JSON `null` maps to `None`
impl<T: JsonCodec> JsonCodec for Option<T> {
    fn to_json(&self) -> Value {
        match self {
            Some(value) => value.to_json(),
            None => Value::Null,
        }
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        match json {
            Value::Null => Ok(None),
            other => T::from_json(other).map(Some),
        }
    }
}

impl<T: JsonCodec> JsonCodec for Vec<T> {
    fn to_json(&self) -> Value {
        Value::Array(self.iter().map(JsonCodec::to_json).collect())
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        match json {
            Value::Array(items) => items.iter().map(T::from_json).collect(),
            _ => Err(unsupported_kind_type(json)),
        }
    }
}

/// An array that must contain at least one element
#[derive(Debug, Clone, PartialEq)]
pub struct NonEmpty<T>(Vec<T>);

impl<T> NonEmpty<T> {
    /// Wrap a vector, returning `None` if it is empty
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self(items))
        }
    }

    pub fn first(&self) -> &T {
        &self.0[0]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<T> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl<T: JsonCodec> JsonCodec for NonEmpty<T> {
    fn to_json(&self) -> Value {
        self.0.to_json()
    }

    fn from_json(json: &Value) -> Result<Self, CodecError> {
        let items = Vec::<T>::from_json(json)?;
        NonEmpty::new(items).ok_or(CodecError::EmptyArray)
    }
}
