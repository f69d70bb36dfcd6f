// Copyright 2025 the MockSpark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scalar cell values.

extern crate alloc;

use alloc::string::String;
use core::cmp::Ordering;
use core::fmt;

/// A single cell of a [`TableFrame`](crate::TableFrame).
///
/// Integers and floats compare (and join) numerically with each other; every other
/// variant only compares with itself.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// 64-bit float. `NaN` is treated as missing by comparisons and sorting.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Microseconds since the Unix epoch (UTC).
    Timestamp(i64),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Null` and for a `NaN` float.
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns `true` for `Int` and `Float`.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// A short lowercase name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Returns the boolean payload, if any.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer payload, if any.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float for both numeric variants.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Orders two values of compatible types.
    ///
    /// Returns `None` when the types are incomparable, when either side is `Null`, or when a
    /// float comparison involves `NaN`.
    pub fn try_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Int(b)) => Some(a.cmp(b)),
            (Self::Int(a), Self::Float(b)) => (*a as f64).partial_cmp(b),
            (Self::Float(a), Self::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Self::Float(a), Self::Float(b)) => a.partial_cmp(b),
            (Self::Str(a), Self::Str(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Element equality as used by column comparisons: missing values never compare equal and
    /// numbers compare across `Int`/`Float`.
    pub fn loose_eq(&self, other: &Self) -> bool {
        if self.is_missing() || other.is_missing() {
            return false;
        }
        self.try_cmp(other) == Some(Ordering::Equal)
    }

    /// Returns `true` if two non-missing values can be ordered against each other.
    pub(crate) fn is_orderable_with(&self, other: &Self) -> bool {
        (self.is_numeric() && other.is_numeric()) || self.try_cmp(other).is_some()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Str(s) => f.write_str(s),
            Self::Timestamp(us) => write!(f, "{us}us"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(feature = "json")]
mod json {
    use serde_json::{Number, Value as JsonValue};

    use super::Value;
    use crate::TableFrameError;

    impl Value {
        /// Converts a JSON scalar into a cell value.
        ///
        /// Integers that fit in `i64` become `Int`, other numbers become `Float`. Arrays and
        /// objects are not valid cells.
        pub fn from_json(value: &JsonValue) -> Result<Self, TableFrameError> {
            match value {
                JsonValue::Null => Ok(Self::Null),
                JsonValue::Bool(b) => Ok(Self::Bool(*b)),
                JsonValue::Number(n) => Ok(n
                    .as_i64()
                    .map(Self::Int)
                    .or_else(|| n.as_f64().map(Self::Float))
                    .unwrap_or(Self::Null)),
                JsonValue::String(s) => Ok(Self::Str(s.clone())),
                JsonValue::Array(_) | JsonValue::Object(_) => Err(
                    TableFrameError::UnsupportedShape("nested array or object in a cell".into()),
                ),
            }
        }

        /// Converts this value into JSON. Non-finite floats become `null`; timestamps are
        /// written as integer microseconds.
        pub fn to_json(&self) -> JsonValue {
            match self {
                Self::Null => JsonValue::Null,
                Self::Bool(b) => JsonValue::Bool(*b),
                Self::Int(i) | Self::Timestamp(i) => JsonValue::Number((*i).into()),
                Self::Float(f) => Number::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
                Self::Str(s) => JsonValue::String(s.clone()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use core::cmp::Ordering;

    use super::Value;

    #[test]
    fn numbers_compare_across_int_and_float() {
        assert_eq!(Value::Int(2).try_cmp(&Value::Float(2.5)), Some(Ordering::Less));
        assert!(Value::Int(3).loose_eq(&Value::Float(3.0)), "3 == 3.0");
        assert_eq!(Value::from("a").try_cmp(&Value::Int(1)), None);
    }

    #[test]
    fn missing_values_never_compare_equal() {
        assert!(!Value::Null.loose_eq(&Value::Null), "null != null");
        assert!(!Value::Float(f64::NAN).loose_eq(&Value::Float(f64::NAN)), "nan != nan");
        assert!(Value::Float(f64::NAN).is_missing(), "nan is missing");
    }

    #[test]
    fn option_converts_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Str("x".into()));
    }

    #[cfg(feature = "json")]
    #[test]
    fn json_conversion_maps_non_finite_floats_to_null() {
        use serde_json::json;

        assert_eq!(Value::Float(f64::NAN).to_json(), json!(null));
        assert_eq!(Value::Float(f64::INFINITY).to_json(), json!(null));
        assert_eq!(Value::Timestamp(7).to_json(), json!(7));
        assert_eq!(Value::from_json(&Value::Float(f64::NAN).to_json()).unwrap(), Value::Null);

        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-3),
            Value::Float(2.5),
            Value::from("x"),
        ] {
            assert_eq!(Value::from_json(&value.to_json()).unwrap(), value);
        }
    }
}
