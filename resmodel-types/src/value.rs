//! Loosely-typed values as decoded from remote API responses.
//!
//! A [`Value`] is whatever a wire decoder handed over: scalars, sequences,
//! nested mappings, date and time values in several shapes, or an already
//! built resource embedded in the payload. Coerced attribute values use the
//! same type, so a model's attribute table is a table of `Value`s.

use crate::{Error, Key, WireDateTime, format_time};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A raw key/value mapping.
///
/// Entries are kept sorted by key, so ingesting a `Map` visits keys in that
/// order. Callers that need positional precedence between an alias and its
/// canonical key ingest a sequence of pairs instead.
pub type Map = BTreeMap<Key, Value>;

/// Looks up `name` in a mapping, accepting a text-shaped or a
/// symbol-shaped key.
#[must_use]
pub fn lookup<'a>(map: &'a Map, name: &str) -> Option<&'a Value> {
    map.get(&Key::text(name))
        .or_else(|| map.get(&Key::symbol(name)))
}

/// A resource that can be embedded inside a [`Value`].
///
/// Implemented by model instances so that payloads can carry already-built
/// resources (an embedded association, or the result of a lookup).
pub trait Resource: fmt::Debug + Send + Sync {
    /// The resource kind, e.g. `"server"`.
    fn kind(&self) -> &str;

    /// The resource's identity value, or nil when it has none.
    fn identity(&self) -> Value;

    /// The attributes that were explicitly supplied to this resource.
    fn snapshot(&self) -> Map;

    /// Access to the concrete type for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// A loosely-typed value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absent or explicit null.
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A calendar date without a time of day.
    Date(NaiveDate),
    /// A date and time of day without a zone.
    DateTime(NaiveDateTime),
    /// A date-time in a foreign wire representation.
    Wire(WireDateTime),
    /// An absolute point in time.
    Time(DateTime<FixedOffset>),
    Array(Vec<Value>),
    Map(Map),
    /// An embedded resource, shared rather than copied.
    Resource(Arc<dyn Resource>),
}

impl Value {
    /// Returns true for [`Value::Nil`].
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Returns true for the empty string.
    #[must_use]
    pub fn is_empty_string(&self) -> bool {
        matches!(self, Self::String(s) if s.is_empty())
    }

    /// Returns true for nil or the empty string.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.is_nil() || self.is_empty_string()
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float for integer and float variants.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_time(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Self::Time(t) => Some(t),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Map> {
        match self {
            Self::Map(map) => Some(map),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_resource(&self) -> Option<&Arc<dyn Resource>> {
        match self {
            Self::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    /// A short name for the variant, used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::String(_) => "string",
            Self::Date(_) => "date",
            Self::DateTime(_) => "datetime",
            Self::Wire(_) => "wire_datetime",
            Self::Time(_) => "time",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
            Self::Resource(_) => "resource",
        }
    }

    /// Converts to JSON.
    ///
    /// Dates and times become strings, non-finite floats become null and
    /// embedded resources become their snapshot object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;

        match self {
            Self::Nil => Json::Null,
            Self::Bool(b) => Json::Bool(*b),
            Self::Integer(i) => Json::from(*i),
            Self::Float(f) => serde_json::Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Self::String(s) => Json::String(s.clone()),
            Self::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Json::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            Self::Wire(w) => Json::String(w.to_string()),
            Self::Time(t) => Json::String(t.to_rfc3339()),
            Self::Array(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Map(map) => map_to_json(map),
            Self::Resource(resource) => map_to_json(&resource.snapshot()),
        }
    }

    /// Parses a JSON document into a mapping.
    pub fn map_from_json_str(input: &str) -> crate::Result<Map> {
        let json: serde_json::Value = serde_json::from_str(input)?;
        Map::try_from(Self::from(json))
    }
}

fn map_to_json(map: &Map) -> serde_json::Value {
    serde_json::Value::Object(
        map.iter()
            .map(|(key, value)| (key.as_str().to_string(), value.to_json()))
            .collect(),
    )
}

fn resources_equal(a: &Arc<dyn Resource>, b: &Arc<dyn Resource>) -> bool {
    Arc::ptr_eq(a, b) || (a.kind() == b.kind() && a.snapshot() == b.snapshot())
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Wire(a), Self::Wire(b)) => a == b,
            (Self::Time(a), Self::Time(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Resource(a), Self::Resource(b)) => resources_equal(a, b),
            _ => false,
        }
    }
}

/// Canonical string form, used when coercing to a string attribute.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nil => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            // Shortest round-trip form; integral floats keep ".0".
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => f.write_str(s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S")),
            Self::Wire(w) => write!(f, "{w}"),
            Self::Time(t) => f.write_str(&format_time(t)),
            Self::Array(_) | Self::Map(_) | Self::Resource(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}

// ── Conversions ──────────────────────────────────────────────────

impl From<serde_json::Value> for Value {
    #[allow(clippy::cast_precision_loss)]
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Self::Nil,
            Json::Bool(b) => Self::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Integer(i)
                } else if let Some(u) = n.as_u64() {
                    Self::Float(u as f64)
                } else {
                    n.as_f64().map_or(Self::Nil, Self::Float)
                }
            }
            Json::String(s) => Self::String(s),
            Json::Array(items) => Self::Array(items.into_iter().map(Self::from).collect()),
            Json::Object(object) => Self::Map(
                object
                    .into_iter()
                    .map(|(key, value)| (Key::Text(key), Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<Value> for Map {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Map(map) => Ok(map),
            other => Err(Error::NotAnObject(other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Self::DateTime(dt)
    }
}

impl From<WireDateTime> for Value {
    fn from(w: WireDateTime) -> Self {
        Self::Wire(w)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(t: DateTime<Tz>) -> Self {
        Self::Time(t.fixed_offset())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Self::Map(map)
    }
}

impl From<Arc<dyn Resource>> for Value {
    fn from(resource: Arc<dyn Resource>) -> Self {
        Self::Resource(resource)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Self::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(option: Option<T>) -> Self {
        option.map_or(Self::Nil, Into::into)
    }
}

impl FromIterator<Self> for Value {
    fn from_iter<I: IntoIterator<Item = Self>>(iter: I) -> Self {
        Self::Array(iter.into_iter().collect())
    }
}
