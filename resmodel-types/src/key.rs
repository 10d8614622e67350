//! Keys of raw input mappings.
//!
//! Remote payloads address fields by plain text (`"keys"`), while callers
//! building input by hand often use symbol-shaped identifiers (`:id`). Both
//! shapes are kept so a mapping can round-trip, but lookups by name treat
//! them alike.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A key in a raw input mapping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    /// Text-shaped key, as produced by wire decoders.
    Text(String),
    /// Symbol-shaped key, as written by callers.
    Symbol(String),
}

impl Key {
    /// Creates a text-shaped key.
    #[must_use]
    pub fn text(name: impl Into<String>) -> Self {
        Self::Text(name.into())
    }

    /// Creates a symbol-shaped key.
    #[must_use]
    pub fn symbol(name: impl Into<String>) -> Self {
        Self::Symbol(name.into())
    }

    /// Returns the key's name regardless of its shape.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(name) | Self::Symbol(name) => name,
        }
    }

    /// Returns true for symbol-shaped keys.
    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Returns true if this key names `name`, in either shape.
    #[must_use]
    pub fn names(&self, name: &str) -> bool {
        self.as_str() == name
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Text(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Text(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Text(name.clone())
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        match key {
            Key::Text(name) | Key::Symbol(name) => name,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(name) => write!(f, "{name}"),
            Self::Symbol(name) => write!(f, ":{name}"),
        }
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    /// Parses `:name` as a symbol key and anything else as a text key.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.strip_prefix(':') {
            Some(name) if !name.is_empty() => Self::symbol(name),
            _ => Self::text(s),
        })
    }
}
