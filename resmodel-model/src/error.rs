//! Error types for schema declaration and model access.

use thiserror::Error;

/// Error returned by an identity-lookup collaborator.
///
/// Carried through [`ModelError::Lookup`] without reinterpretation.
pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration errors, raised while a schema is being built.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Two attributes share a canonical name.
    #[error("attribute `{0}` is declared twice")]
    DuplicateAttribute(String),

    /// Two associations share a name.
    #[error("association `{0}` is declared twice")]
    DuplicateAssociation(String),

    /// More than one identity attribute.
    #[error("identity already declared as `{existing}`, cannot also use `{name}`")]
    DuplicateIdentity { existing: String, name: String },

    /// An alias is already taken by another attribute's alias or name.
    #[error("alias `{alias}` of `{attribute}` collides with `{existing}`")]
    AliasCollision {
        alias: String,
        attribute: String,
        existing: String,
    },

    /// An association name is already used by an attribute or alias.
    #[error("association `{0}` collides with an attribute name or alias")]
    NameCollision(String),

    /// An association refers to a collection the service does not expose.
    #[error("association `{association}` refers to unknown collection `{collection}`")]
    UnknownCollection {
        association: String,
        collection: String,
    },

    /// A declarative schema definition could not be parsed.
    #[error("invalid schema definition: {0}")]
    Definition(#[from] serde_json::Error),
}

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while reading or writing a model instance.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("{kind} has no attribute `{name}`")]
    UnknownAttribute { kind: String, name: String },

    #[error("{kind} has no association `{name}`")]
    UnknownAssociation { kind: String, name: String },

    /// An identity association was read on an instance with no service.
    #[error("association `{association}` needs a service, but none is attached")]
    NoService { association: String },

    /// The attached service does not provide the association's collection.
    #[error("service has no collection `{collection}` for association `{association}`")]
    MissingCollection {
        association: String,
        collection: String,
    },

    /// The lookup collaborator failed; its error is passed through as is.
    #[error(transparent)]
    Lookup(LookupError),
}

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
