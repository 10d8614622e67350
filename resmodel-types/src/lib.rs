//! Raw value types for resmodel.
//!
//! This crate defines the loosely-typed data the modeling layer consumes:
//! - [`Key`] identifiers, in text or symbol shape
//! - [`Value`], the parsed body of a remote API response (scalars,
//!   sequences, nested mappings, date/time values, embedded resources)
//! - [`WireDateTime`] and the time helpers used by attribute coercion
//!
//! Nothing here knows about schemas. Coercion and association handling
//! live in `resmodel-model`.

mod key;
mod timestamp;
mod value;

pub use key::Key;
pub use timestamp::{WireDateTime, date_to_time, epoch, format_time, naive_to_time, parse_time};
pub use value::{Map, Resource, Value, lookup};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building raw values.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    #[error("invalid wire date-time: {0}")]
    InvalidWireDateTime(String),
}
