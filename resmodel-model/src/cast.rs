//! Attribute coercion.
//!
//! Every caster is total: input that does not fit the type collapses to the
//! type's nil or empty value instead of failing.

use crate::AttributeType;
use chrono::{DateTime, FixedOffset, Timelike};
use resmodel_types::{Value, date_to_time, epoch, naive_to_time, parse_time};

impl AttributeType {
    /// Coerces a raw value into this type.
    #[must_use]
    pub fn cast(self, value: Value) -> Value {
        match self {
            Self::Identity => value,
            Self::String => cast_string(value),
            Self::Boolean => cast_boolean(&value),
            Self::Float => cast_float(&value),
            Self::Integer => cast_integer(&value),
            Self::Time => cast_time(value),
            Self::Timestamp => cast_timestamp(&value),
            Self::Array => cast_array(value),
        }
    }

    /// The value an unset attribute of this type reads as: the cast of nil.
    #[must_use]
    pub fn empty_value(self) -> Value {
        self.cast(Value::Nil)
    }
}

fn cast_string(value: Value) -> Value {
    match value {
        Value::String(s) => Value::String(s),
        other => Value::String(other.to_string()),
    }
}

fn cast_boolean(value: &Value) -> Value {
    match value {
        Value::Bool(b) => Value::Bool(*b),
        Value::String(s) if s == "true" => Value::Bool(true),
        Value::String(s) if s == "false" => Value::Bool(false),
        _ => Value::Nil,
    }
}

fn cast_float(value: &Value) -> Value {
    match value {
        Value::Integer(_) | Value::Float(_) => value
            .as_f64()
            .filter(|f| f.is_finite())
            .map_or(Value::Nil, Value::Float),
        Value::String(s) => parse_float(s).map_or(Value::Nil, Value::Float),
        _ => Value::Nil,
    }
}

fn cast_integer(value: &Value) -> Value {
    match value {
        Value::Integer(i) => Value::Integer(*i),
        Value::Float(f) => truncate(*f).map_or(Value::Nil, Value::Integer),
        Value::String(s) => parse_integer(s).map_or(Value::Nil, Value::Integer),
        _ => Value::Nil,
    }
}

fn cast_time(value: Value) -> Value {
    match value {
        Value::Nil => Value::Nil,
        Value::String(s) if s.is_empty() => Value::String(s),
        other => to_time(&other).map_or(Value::Nil, Value::Time),
    }
}

fn cast_timestamp(value: &Value) -> Value {
    let time = match value {
        Value::Integer(secs) => from_seconds(*secs),
        Value::Float(f) => truncate(*f).and_then(from_seconds),
        Value::String(s) => {
            parse_time(s).or_else(|| parse_integer(s).and_then(from_seconds))
        }
        other => to_time(other),
    };
    let time = time.unwrap_or_else(epoch);
    Value::Time(time.with_nanosecond(0).unwrap_or(time))
}

fn cast_array(value: Value) -> Value {
    match value {
        Value::Nil => Value::Array(Vec::new()),
        Value::String(s) if s.is_empty() => Value::Array(Vec::new()),
        Value::Array(items) => Value::Array(items),
        other => Value::Array(vec![other]),
    }
}

/// Converts time-shaped values and parseable strings to an absolute time.
fn to_time(value: &Value) -> Option<DateTime<FixedOffset>> {
    match value {
        Value::Time(t) => Some(*t),
        Value::Date(d) => Some(date_to_time(*d)),
        Value::DateTime(dt) => Some(naive_to_time(*dt)),
        Value::Wire(w) => Some(w.to_time()),
        Value::String(s) => parse_time(s),
        _ => None,
    }
}

fn from_seconds(secs: i64) -> Option<DateTime<FixedOffset>> {
    DateTime::from_timestamp(secs, 0).map(|t| t.fixed_offset())
}

fn parse_float(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_integer(s: &str) -> Option<i64> {
    let s = s.trim();
    s.parse::<i64>()
        .ok()
        .or_else(|| parse_float(s).and_then(truncate))
}

/// Truncates toward zero; `None` when the result does not fit an `i64`.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate(f: f64) -> Option<i64> {
    const LIMIT: f64 = i64::MAX as f64;
    let t = f.trunc();
    (t.is_finite() && t >= -LIMIT && t < LIMIT).then(|| t as i64)
}
