//! Value predicates and type names for dynamic field values.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Returns `true` for `null` and `false`, the values a default replaces.
#[must_use]
pub fn is_falsy(value: &Value) -> bool {
    matches!(value, Value::Null | Value::Bool(false))
}

/// Returns `true` for values that fail a presence check.
///
/// Blank values are `null`, `false`, whitespace-only strings, empty arrays
/// and empty objects. Numbers are never blank.
///
/// ```
/// use axn_validator::is_blank;
/// use serde_json::json;
///
/// assert!(is_blank(&json!("  ")));
/// assert!(is_blank(&json!([])));
/// assert!(!is_blank(&json!(0)));
/// ```
#[must_use]
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Bool(true) | Value::Number(_) => false,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// The kinds of value a type rule can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// JSON `null`.
    Null,
    /// `true` or `false`.
    Boolean,
    /// A number with no fractional representation.
    Integer,
    /// A number stored as floating point.
    Float,
    /// Any number.
    Numeric,
    /// A string.
    String,
    /// An array.
    Array,
    /// An object.
    Object,
}

impl ValueType {
    /// Name used in violation messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Numeric => "Numeric",
            Self::String => "String",
            Self::Array => "Array",
            Self::Object => "Object",
        }
    }

    /// Whether `value` is of this type.
    ///
    /// `Numeric` accepts every number; `Integer` only numbers representable
    /// as `i64`/`u64`; `Float` only numbers stored as `f64`.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Null, Value::Null)
            | (Self::Boolean, Value::Bool(_))
            | (Self::Numeric, Value::Number(_))
            | (Self::String, Value::String(_))
            | (Self::Array, Value::Array(_))
            | (Self::Object, Value::Object(_)) => true,
            (Self::Integer, Value::Number(n)) => n.is_i64() || n.is_u64(),
            (Self::Float, Value::Number(n)) => n.is_f64(),
            _ => false,
        }
    }

    /// The most specific type of `value`.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(n) if n.is_f64() => Self::Float,
            Value::Number(_) => Self::Integer,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Formats a bound for a message: integral floats print without `.0`.
pub(crate) fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}
