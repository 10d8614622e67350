use crate::error::{ModelError, ModelResult};
use crate::schema::{Schema, Target};
use crate::service::Service;
use resmodel_types::{Key, Map, Resource, Value, lookup};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// State of one attribute slot.
#[derive(Debug, Clone, PartialEq)]
enum Slot {
    Unset,
    Explicit(Value),
}

/// State of one association slot.
#[derive(Debug, Clone, Default)]
pub(crate) enum Link {
    #[default]
    Empty,
    /// Raw value as ingested, not yet resolved.
    Unresolved(Value),
    /// Resolved or directly assigned value, returned as is on every read.
    Resolved(Value),
}

/// An instance of a resource described by a [`Schema`].
///
/// Owns its attribute table and association cache. Ingesting raw input
/// coerces each value per its attribute type; association values are kept
/// raw until first read.
#[derive(Clone)]
pub struct Model {
    schema: Arc<Schema>,
    service: Option<Arc<dyn Service>>,
    slots: Vec<Slot>,
    pub(crate) links: Vec<Link>,
}

impl Model {
    /// Creates an empty instance: every attribute unset, no associations.
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        let slots = vec![Slot::Unset; schema.attributes().len()];
        let links = vec![Link::Empty; schema.associations().len()];
        Self {
            schema,
            service: None,
            slots,
            links,
        }
    }

    /// Attaches the service used to resolve identity associations.
    #[must_use]
    pub fn with_service(mut self, service: Arc<dyn Service>) -> Self {
        self.service = Some(service);
        self
    }

    /// Ingests `raw` and returns the instance.
    #[must_use]
    pub fn with_attributes<I, K>(mut self, raw: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Key>,
    {
        self.ingest(raw);
        self
    }

    pub fn set_service(&mut self, service: Arc<dyn Service>) {
        self.service = Some(service);
    }

    #[must_use]
    pub fn service(&self) -> Option<&Arc<dyn Service>> {
        self.service.as_ref()
    }

    #[must_use]
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    /// Merges raw key/value input into the instance.
    ///
    /// Keys resolve through the alias table, then canonical names, then
    /// association names. Ignored and unknown keys are skipped. Attribute
    /// values are squashed and cast; association values are stored raw and
    /// replace any cached resolution.
    ///
    /// Entries are applied in iteration order, so when an alias and its
    /// canonical key both appear the later entry wins. A [`Map`] iterates in
    /// key order.
    pub fn ingest<I, K>(&mut self, raw: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<Key>,
    {
        for (key, value) in raw {
            let key = key.into();
            match self.schema.target(key.as_str()) {
                Target::Attribute(index) => self.store(index, value),
                Target::Association(index) => self.links[index] = Link::Unresolved(value),
                Target::Ignored => {
                    trace!(kind = self.schema.kind(), key = %key, "skipping ignored key");
                }
                Target::Unknown => {
                    trace!(kind = self.schema.kind(), key = %key, "skipping unknown key");
                }
            }
        }
        self
    }

    /// Reads an attribute by canonical name or alias.
    ///
    /// Returns the supplied value if there is one. Otherwise a non-persisted
    /// instance returns the declared default, and anything else the type's
    /// empty value.
    pub fn attribute(&self, name: &str) -> ModelResult<Value> {
        let index = self.attribute_index(name)?;
        Ok(self.read(index, !self.is_persisted()))
    }

    /// Direct setter: squashes, casts and stores `value` exactly like
    /// ingestion would.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let index = self.attribute_index(name)?;
        self.store(index, value.into());
        Ok(())
    }

    /// Whether the attribute was explicitly supplied, even as nil.
    pub fn is_supplied(&self, name: &str) -> ModelResult<bool> {
        let index = self.attribute_index(name)?;
        Ok(matches!(self.slots[index], Slot::Explicit(_)))
    }

    /// The identity value, nil when unset or when no identity is declared.
    #[must_use]
    pub fn identity(&self) -> Value {
        match self.schema.identity_index().map(|index| &self.slots[index]) {
            Some(Slot::Explicit(value)) => value.clone(),
            _ => Value::Nil,
        }
    }

    /// An instance is persisted once a non-nil identity was supplied.
    #[must_use]
    pub fn is_persisted(&self) -> bool {
        !self.identity().is_nil()
    }

    /// The explicitly supplied attributes only.
    #[must_use]
    pub fn attributes(&self) -> Map {
        self.schema
            .attributes()
            .iter()
            .zip(&self.slots)
            .filter_map(|(spec, slot)| match slot {
                Slot::Explicit(value) => Some((Key::symbol(&spec.name), value.clone())),
                Slot::Unset => None,
            })
            .collect()
    }

    /// Every declared attribute with the value a read would return.
    ///
    /// Declared defaults fill unset attributes only while the instance is
    /// not persisted.
    #[must_use]
    pub fn all_attributes(&self) -> Map {
        let use_defaults = !self.is_persisted();
        self.schema
            .attributes()
            .iter()
            .enumerate()
            .map(|(index, spec)| (Key::symbol(&spec.name), self.read(index, use_defaults)))
            .collect()
    }

    /// Wraps the instance for embedding in a [`Value`].
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Resource(Arc::new(self))
    }

    fn read(&self, index: usize, use_default: bool) -> Value {
        let spec = &self.schema.attributes()[index];
        match &self.slots[index] {
            Slot::Explicit(value) => value.clone(),
            Slot::Unset => match &spec.default {
                Some(default) if use_default => default.resolve(),
                _ => spec.empty_value(),
            },
        }
    }

    fn store(&mut self, index: usize, value: Value) {
        let spec = &self.schema.attributes()[index];
        let value = match &spec.squash {
            Some(inner) => squash(value, inner),
            None => value,
        };
        self.slots[index] = Slot::Explicit(spec.kind.cast(value));
    }

    fn attribute_index(&self, name: &str) -> ModelResult<usize> {
        self.schema
            .attribute_index(name)
            .ok_or_else(|| ModelError::UnknownAttribute {
                kind: self.schema.kind().to_string(),
                name: name.to_string(),
            })
    }
}

/// Extracts the squash key from a mapping. A mapping without that key is
/// kept whole, wrapped as a one-element sequence; other values pass through.
fn squash(value: Value, inner: &str) -> Value {
    match value {
        Value::Map(map) => match lookup(&map, inner) {
            Some(found) => found.clone(),
            None => Value::Array(vec![Value::Map(map)]),
        },
        other => other,
    }
}

impl Resource for Model {
    fn kind(&self) -> &str {
        self.schema.kind()
    }

    fn identity(&self) -> Value {
        Self::identity(self)
    }

    fn snapshot(&self) -> Map {
        self.attributes()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl From<Model> for Value {
    fn from(model: Model) -> Self {
        model.into_value()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("kind", &self.schema.kind())
            .field("attributes", &self.attributes())
            .field("links", &self.links)
            .field("service", &self.service.is_some())
            .finish()
    }
}

/// Access to models embedded in values.
pub trait ModelValue {
    /// The embedded model, if this value wraps one.
    fn as_model(&self) -> Option<&Model>;

    /// Embedded models of a sequence, skipping entries that are not models.
    fn models(&self) -> Vec<&Model>;
}

impl ModelValue for Value {
    fn as_model(&self) -> Option<&Model> {
        self.as_resource()
            .and_then(|resource| resource.as_any().downcast_ref::<Model>())
    }

    fn models(&self) -> Vec<&Model> {
        self.as_array()
            .unwrap_or_default()
            .iter()
            .filter_map(ModelValue::as_model)
            .collect()
    }
}
