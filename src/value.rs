use std::collections::BTreeMap;

use num_bigint::BigInt;

/// Decoded JSON tree returned by endpoint execution.
///
/// Structurally identical to the response body; numeric leaves land as
/// [`Value::Number`] or [`Value::BigInt`] depending on the request's
/// [`IntDecoding`](crate::IntDecoding) mode.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Numeric literal decoded natively. Integer literals above 2^53 lose
    /// precision here; the other decoding modes exist to avoid that.
    Number(f64),
    /// Integer literal carried with arbitrary precision.
    BigInt(BigInt),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    pub fn number(value: f64) -> Self {
        Self::Number(value)
    }

    pub fn big_int(value: impl Into<BigInt>) -> Self {
        Self::BigInt(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Field lookup on [`Value::Object`]; `None` for every other variant.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    /// Integral value as `u64`, from either numeric variant.
    ///
    /// `Number` converts only when it is a non-negative integer inside the
    /// safe range; `BigInt` converts whenever it fits.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(value) => {
                let in_range = *value >= 0.0 && *value <= crate::decode::MAX_SAFE_INTEGER as f64;
                (value.fract() == 0.0 && in_range).then_some(*value as u64)
            }
            Self::BigInt(value) => u64::try_from(value).ok(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bigint(&self) -> Option<&BigInt> {
        match self {
            Self::BigInt(value) => Some(value),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<BigInt> for Value {
    fn from(value: BigInt) -> Self {
        Self::BigInt(value)
    }
}
