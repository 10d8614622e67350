use crate::error::{SchemaError, SchemaResult};
use crate::service::Service;
use resmodel_types::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// The semantic type of an attribute, selecting its caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    /// Untyped: values are stored exactly as ingested.
    #[default]
    #[serde(alias = "default", alias = "untyped")]
    Identity,
    String,
    #[serde(alias = "bool")]
    Boolean,
    Float,
    Integer,
    /// Absolute time; nil stays nil and the empty string is preserved.
    Time,
    /// Absolute time that is never nil; blank input becomes the epoch.
    Timestamp,
    Array,
}

/// A declared default for an attribute.
#[derive(Clone)]
pub enum DefaultValue {
    /// Returned as is.
    Static(Value),
    /// Evaluated on every read.
    Producer(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Returns the default, running the producer if there is one.
    #[must_use]
    pub fn resolve(&self) -> Value {
        match self {
            Self::Static(value) => value.clone(),
            Self::Producer(produce) => produce(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}

/// A declared attribute.
#[derive(Debug, Clone)]
pub struct AttributeSpec {
    pub name: String,
    /// Alternate input keys resolving to `name`.
    pub aliases: Vec<String>,
    /// Inner key extracted when the ingested value is a mapping.
    pub squash: Option<String>,
    pub kind: AttributeType,
    pub default: Option<DefaultValue>,
}

impl AttributeSpec {
    /// The value read for this attribute when it was never supplied and no
    /// default applies.
    #[must_use]
    pub fn empty_value(&self) -> Value {
        self.kind.empty_value()
    }
}

/// Options for [`SchemaBuilder::attribute`].
#[derive(Debug, Clone, Default)]
pub struct AttributeOptions {
    aliases: Vec<String>,
    squash: Option<String>,
    kind: AttributeType,
    default: Option<DefaultValue>,
}

impl AttributeOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for an attribute of the given type.
    #[must_use]
    pub fn of(kind: AttributeType) -> Self {
        Self {
            kind,
            ..Self::default()
        }
    }

    /// Shorthand for a string attribute.
    #[must_use]
    pub fn string() -> Self {
        Self::of(AttributeType::String)
    }

    /// Shorthand for a boolean attribute.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(AttributeType::Boolean)
    }

    /// Shorthand for a float attribute.
    #[must_use]
    pub fn float() -> Self {
        Self::of(AttributeType::Float)
    }

    /// Shorthand for an integer attribute.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(AttributeType::Integer)
    }

    /// Shorthand for a time attribute.
    #[must_use]
    pub fn time() -> Self {
        Self::of(AttributeType::Time)
    }

    /// Shorthand for a timestamp attribute.
    #[must_use]
    pub fn timestamp() -> Self {
        Self::of(AttributeType::Timestamp)
    }

    /// Shorthand for an array attribute.
    #[must_use]
    pub fn array() -> Self {
        Self::of(AttributeType::Array)
    }

    #[must_use]
    pub const fn kind(mut self, kind: AttributeType) -> Self {
        self.kind = kind;
        self
    }

    /// Adds one alias. Blank aliases are dropped at build time.
    #[must_use]
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Adds several aliases.
    #[must_use]
    pub fn aliases<I, A>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<String>,
    {
        self.aliases.extend(aliases.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn squash(mut self, key: impl Into<String>) -> Self {
        self.squash = Some(key.into());
        self
    }

    /// Declares a static default. `Value::Nil` and `false` are valid
    /// defaults and differ from declaring none.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(DefaultValue::Static(value.into()));
        self
    }

    /// Declares a default produced fresh on every read.
    #[must_use]
    pub fn default_with<F>(mut self, produce: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Producer(Arc::new(produce)));
        self
    }
}

/// Whether an association refers to one resource or many.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    #[default]
    #[serde(alias = "one")]
    Single,
    #[serde(alias = "many")]
    Multiple,
}

/// How an association's raw value refers to the related resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reference {
    /// The payload embeds the related resource itself.
    #[default]
    #[serde(alias = "object")]
    Embedded,
    /// The payload carries only the identity; the resource is looked up.
    Identity,
}

/// A declared association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationSpec {
    pub name: String,
    /// Name of the service collection used for identity lookups.
    pub collection: String,
    pub cardinality: Cardinality,
    pub reference: Reference,
}

/// Options for [`SchemaBuilder::association`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AssociationOptions {
    cardinality: Cardinality,
    reference: Reference,
}

impl AssociationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to multiple cardinality.
    #[must_use]
    pub const fn many(mut self) -> Self {
        self.cardinality = Cardinality::Multiple;
        self
    }

    /// Switches to identity references.
    #[must_use]
    pub const fn identity(mut self) -> Self {
        self.reference = Reference::Identity;
        self
    }

    #[must_use]
    pub const fn cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    #[must_use]
    pub const fn reference(mut self, reference: Reference) -> Self {
        self.reference = reference;
        self
    }
}

/// Where an input key is routed during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Attribute(usize),
    Association(usize),
    Ignored,
    Unknown,
}

/// An immutable resource schema: attributes, aliases and associations.
///
/// Built once with [`SchemaBuilder`] (or compiled from a
/// [`SchemaDefinition`](crate::SchemaDefinition)) and shared between
/// instances behind an `Arc`.
#[derive(Debug)]
pub struct Schema {
    kind: String,
    attributes: Vec<AttributeSpec>,
    associations: Vec<AssociationSpec>,
    identity: Option<usize>,
    names: HashMap<String, usize>,
    aliases: HashMap<String, usize>,
    association_names: HashMap<String, usize>,
    ignored: HashSet<String>,
}

impl Schema {
    /// Starts declaring a schema for resources of `kind`.
    #[must_use]
    pub fn builder(kind: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder::new(kind)
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Declared attributes, in declaration order.
    #[must_use]
    pub fn attributes(&self) -> &[AttributeSpec] {
        &self.attributes
    }

    /// Looks up an attribute by canonical name or alias.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeSpec> {
        self.attribute_index(name).map(|index| &self.attributes[index])
    }

    /// Declared associations, in declaration order.
    #[must_use]
    pub fn associations(&self) -> &[AssociationSpec] {
        &self.associations
    }

    #[must_use]
    pub fn association(&self, name: &str) -> Option<&AssociationSpec> {
        self.association_index(name)
            .map(|index| &self.associations[index])
    }

    /// The identity attribute, if one was declared.
    #[must_use]
    pub fn identity(&self) -> Option<&AttributeSpec> {
        self.identity.map(|index| &self.attributes[index])
    }

    /// The alias table: alias → canonical attribute name.
    #[must_use]
    pub fn aliases(&self) -> BTreeMap<&str, &str> {
        self.aliases
            .iter()
            .map(|(alias, &index)| (alias.as_str(), self.attributes[index].name.as_str()))
            .collect()
    }

    #[must_use]
    pub fn is_ignored(&self, key: &str) -> bool {
        self.ignored.contains(key)
    }

    /// Verifies that `service` provides every collection the associations
    /// refer to.
    pub fn check_service(&self, service: &dyn Service) -> SchemaResult<()> {
        for association in &self.associations {
            if !service.has_collection(&association.collection) {
                return Err(SchemaError::UnknownCollection {
                    association: association.name.clone(),
                    collection: association.collection.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn identity_index(&self) -> Option<usize> {
        self.identity
    }

    pub(crate) fn attribute_index(&self, name: &str) -> Option<usize> {
        self.aliases
            .get(name)
            .or_else(|| self.names.get(name))
            .copied()
    }

    pub(crate) fn association_index(&self, name: &str) -> Option<usize> {
        self.association_names.get(name).copied()
    }

    /// Routes an input key: ignored keys first, then aliases, canonical
    /// attribute names and association names.
    pub(crate) fn target(&self, key: &str) -> Target {
        if self.is_ignored(key) {
            Target::Ignored
        } else if let Some(index) = self.attribute_index(key) {
            Target::Attribute(index)
        } else if let Some(index) = self.association_index(key) {
            Target::Association(index)
        } else {
            Target::Unknown
        }
    }
}

/// Declares a [`Schema`].
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    kind: String,
    attributes: Vec<AttributeSpec>,
    associations: Vec<AssociationSpec>,
    identities: Vec<String>,
    ignored: Vec<String>,
    collections: Option<HashSet<String>>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Declares the identity attribute. Its presence decides whether an
    /// instance counts as persisted.
    #[must_use]
    pub fn identity(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        let name = name.into();
        self.identities.push(name.clone());
        self.attribute(name, options)
    }

    #[must_use]
    pub fn attribute(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        self.attributes.push(AttributeSpec {
            name: name.into(),
            aliases: options.aliases,
            squash: options.squash,
            kind: options.kind,
            default: options.default,
        });
        self
    }

    #[must_use]
    pub fn association(
        mut self,
        name: impl Into<String>,
        collection: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.associations.push(AssociationSpec {
            name: name.into(),
            collection: collection.into(),
            cardinality: options.cardinality,
            reference: options.reference,
        });
        self
    }

    /// Input keys that ingestion skips.
    #[must_use]
    pub fn ignore<I, K>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.ignored.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Names of the collections the service exposes. When given, `build`
    /// rejects associations referring to any other collection.
    #[must_use]
    pub fn collections<I, K>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        self.collections = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validates the declarations and freezes them into a [`Schema`].
    pub fn build(self) -> SchemaResult<Schema> {
        let Self {
            kind,
            mut attributes,
            associations,
            identities,
            ignored,
            collections,
        } = self;

        if let [existing, name, ..] = identities.as_slice() {
            return Err(SchemaError::DuplicateIdentity {
                existing: existing.clone(),
                name: name.clone(),
            });
        }

        let mut names = HashMap::new();
        for (index, attribute) in attributes.iter().enumerate() {
            if names.insert(attribute.name.clone(), index).is_some() {
                return Err(SchemaError::DuplicateAttribute(attribute.name.clone()));
            }
        }

        let mut aliases: HashMap<String, usize> = HashMap::new();
        for (index, attribute) in attributes.iter_mut().enumerate() {
            attribute
                .aliases
                .retain(|alias| !alias.trim().is_empty() && *alias != attribute.name);
            attribute.aliases.dedup();

            for alias in &attribute.aliases {
                let taken = aliases
                    .get(alias)
                    .or_else(|| names.get(alias))
                    .filter(|&&owner| owner != index);
                if let Some(&owner) = taken {
                    return Err(SchemaError::AliasCollision {
                        alias: alias.clone(),
                        attribute: attribute.name.clone(),
                        existing: name_of(&names, owner),
                    });
                }
                aliases.insert(alias.clone(), index);
            }
        }

        let mut association_names = HashMap::new();
        for (index, association) in associations.iter().enumerate() {
            if names.contains_key(&association.name) || aliases.contains_key(&association.name) {
                return Err(SchemaError::NameCollision(association.name.clone()));
            }
            if association_names
                .insert(association.name.clone(), index)
                .is_some()
            {
                return Err(SchemaError::DuplicateAssociation(association.name.clone()));
            }
            if let Some(available) = &collections {
                if !available.contains(&association.collection) {
                    return Err(SchemaError::UnknownCollection {
                        association: association.name.clone(),
                        collection: association.collection.clone(),
                    });
                }
            }
        }

        let identity = identities.first().and_then(|name| names.get(name).copied());

        debug!(
            kind = %kind,
            attributes = attributes.len(),
            associations = associations.len(),
            aliases = aliases.len(),
            "built schema"
        );

        Ok(Schema {
            kind,
            attributes,
            associations,
            identity,
            names,
            aliases,
            association_names,
            ignored: ignored.into_iter().collect(),
        })
    }
}

fn name_of(names: &HashMap<String, usize>, index: usize) -> String {
    names
        .iter()
        .find_map(|(name, &i)| (i == index).then(|| name.clone()))
        .unwrap_or_default()
}
