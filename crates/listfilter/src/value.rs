//! Evaluated scalar values.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Computed numbers above this are treated as epoch milliseconds.
///
/// `1e12` milliseconds is 2001-09-09, so any realistic "recent instant"
/// arithmetic result lands above it while counts and sizes stay below.
pub const TIMESTAMP_MILLIS_THRESHOLD: f64 = 1e12;

/// A fully evaluated scalar.
///
/// This is the only value representation that reaches a [`Predicate`]; every
/// consumer matches it exhaustively.
///
/// [`Predicate`]: crate::Predicate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// A string.
    String(String),
    /// A double-precision number.
    Number(f64),
    /// A boolean.
    Bool(bool),
    /// `null`.
    Null,
    /// An instant in UTC.
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// A short name for the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Returns the string if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a number value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the instant if this is a timestamp value.
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
            Value::Timestamp(t) => f.write_str(&t.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

/// Reinterprets a computed number as a timestamp when it exceeds
/// [`TIMESTAMP_MILLIS_THRESHOLD`].
///
/// Only results of arithmetic go through this; a number literal written
/// directly in a filter always stays a number. Returns `None` when the number
/// is above the threshold but outside the representable range of instants.
pub fn infer_timestamp(number: f64) -> Option<Value> {
    if number > TIMESTAMP_MILLIS_THRESHOLD {
        timestamp_from_millis(number).map(Value::Timestamp)
    } else {
        Some(Value::Number(number))
    }
}

/// Converts fractional epoch milliseconds to an instant (microsecond precision).
pub fn timestamp_from_millis(millis: f64) -> Option<DateTime<Utc>> {
    let micros = (millis * 1_000.0).round();
    if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64)
}

/// Converts an instant to fractional epoch milliseconds.
pub fn timestamp_to_millis(timestamp: &DateTime<Utc>) -> f64 {
    timestamp.timestamp_micros() as f64 / 1_000.0
}
