//! Declarative schema definitions.
//!
//! A [`SchemaDefinition`] describes a resource kind as data, so a catalog of
//! resource kinds can ship as JSON next to the code that ingests them:
//!
//! ```json
//! {
//!   "kind": "server",
//!   "identity": { "name": "id" },
//!   "attributes": [
//!     { "name": "flavor", "aliases": "flavorRef", "squash": "id" },
//!     { "name": "created_at", "type": "time" },
//!     { "name": "state", "default": "pending" }
//!   ],
//!   "associations": [
//!     { "name": "volumes", "collection": "volumes", "magnitude": "many", "type": "identity" }
//!   ]
//! }
//! ```

use crate::error::SchemaResult;
use crate::schema::{
    AssociationOptions, AttributeOptions, AttributeType, Cardinality, Reference, Schema,
    SchemaBuilder,
};
use resmodel_types::Value;
use serde::{Deserialize, Deserializer, Serialize};

/// A resource kind described as data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<AttributeDefinition>,
    #[serde(default)]
    pub attributes: Vec<AttributeDefinition>,
    #[serde(default)]
    pub associations: Vec<AssociationDefinition>,
    /// Input keys skipped during ingestion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    #[serde(alias = "ignored")]
    pub ignore: Vec<String>,
}

/// One attribute of a [`SchemaDefinition`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Aliases::is_none")]
    #[serde(alias = "alias")]
    pub aliases: Aliases,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub squash: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: AttributeType,
    /// `None` when no default is declared; `Some(Value::Nil)` for an
    /// explicit `"default": null`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

/// Alias declaration: absent/null, a single key, or a list of keys (null
/// entries are dropped).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Aliases {
    #[default]
    None,
    One(String),
    Many(Vec<Option<String>>),
}

impl Aliases {
    #[must_use]
    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// The declared aliases, nulls removed.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::None => Vec::new(),
            Self::One(alias) => vec![alias.clone()],
            Self::Many(aliases) => aliases.iter().flatten().cloned().collect(),
        }
    }
}

/// One association of a [`SchemaDefinition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationDefinition {
    pub name: String,
    pub collection: String,
    #[serde(default, alias = "magnitude")]
    pub cardinality: Cardinality,
    #[serde(rename = "type", default)]
    pub reference: Reference,
}

impl SchemaDefinition {
    /// Parses a definition from JSON.
    pub fn from_json(input: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// A builder holding every declaration of this definition, for callers
    /// that want to add to it (e.g. `collections`) before building.
    #[must_use]
    pub fn builder(&self) -> SchemaBuilder {
        let mut builder = Schema::builder(&self.kind);

        if let Some(identity) = &self.identity {
            builder = builder.identity(&identity.name, identity.options());
        }
        for attribute in &self.attributes {
            builder = builder.attribute(&attribute.name, attribute.options());
        }
        for association in &self.associations {
            builder = builder.association(
                &association.name,
                &association.collection,
                AssociationOptions::new()
                    .cardinality(association.cardinality)
                    .reference(association.reference),
            );
        }
        builder.ignore(self.ignore.iter().cloned())
    }

    /// Builds the schema this definition describes.
    pub fn compile(&self) -> SchemaResult<Schema> {
        self.builder().build()
    }
}

impl AttributeDefinition {
    fn options(&self) -> AttributeOptions {
        let mut options = AttributeOptions::of(self.kind).aliases(self.aliases.to_vec());
        if let Some(squash) = &self.squash {
            options = options.squash(squash);
        }
        if let Some(default) = &self.default {
            options = options.default_value(default.clone());
        }
        options
    }
}

/// Maps a present field to `Some`, including an explicit null, so it can be
/// told apart from a missing one.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
