//! Typed resource models for remote-service APIs.
//!
//! Turns loosely-typed API payloads into typed model instances:
//! - [`Schema`]: declared attributes (aliases, squash key, type, default)
//!   and associations, built once with [`SchemaBuilder`] or compiled from a
//!   [`SchemaDefinition`]
//! - [`AttributeType::cast`]: the total coercion rules for each attribute type
//! - [`Model`]: one resource instance: attribute table with unset/explicit
//!   slots, default handling, and a lazily resolved association cache
//! - [`Service`] / [`Collection`]: the lookup collaborators identity
//!   associations resolve through
//!
//! Everything is synchronous. A lookup is a direct call into the caller's
//! collaborator; its failures are returned to the caller unchanged.

mod association;
mod cast;
mod definition;
mod error;
mod model;
mod schema;
mod service;

pub use definition::{Aliases, AssociationDefinition, AttributeDefinition, SchemaDefinition};
pub use error::{LookupError, ModelError, ModelResult, SchemaError, SchemaResult};
pub use model::{Model, ModelValue};
pub use schema::{
    AssociationOptions, AssociationSpec, AttributeOptions, AttributeSpec, AttributeType,
    Cardinality, DefaultValue, Reference, Schema, SchemaBuilder,
};
pub use service::{Collection, Collections, Service};

pub use resmodel_types::{Key, Map, Value};
