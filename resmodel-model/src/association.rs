//! Lazy association resolution.
//!
//! Each association slot holds either the raw ingested value or the
//! resolved one. The first read resolves and caches; later reads return the
//! cached value until the slot is overwritten by ingestion or a setter.

use crate::error::{ModelError, ModelResult};
use crate::model::{Link, Model};
use crate::schema::{AssociationSpec, AttributeType, Cardinality, Reference};
use crate::service::Collection;
use resmodel_types::{Key, Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

static NIL: Value = Value::Nil;

impl Link {
    fn value(&self) -> &Value {
        match self {
            Self::Empty => &NIL,
            Self::Unresolved(value) | Self::Resolved(value) => value,
        }
    }
}

impl Model {
    /// Reads an association, resolving and caching it on first access.
    ///
    /// - single, embedded: the stored value (model or nil);
    /// - single, identity: the collaborator's result for the stored identity,
    ///   nil without a lookup when none is stored;
    /// - multiple, embedded: the stored sequence, `[]` when unset;
    /// - multiple, identity: one lookup per identity, in input order.
    ///
    /// A failed lookup leaves the slot unresolved and returns the
    /// collaborator's error.
    pub fn association(&mut self, name: &str) -> ModelResult<&Value> {
        let index = self.association_index(name)?;

        if !matches!(self.links[index], Link::Resolved(_)) {
            let spec = &self.schema().associations()[index];
            let resolved = self.resolve(spec, self.links[index].value())?;
            self.links[index] = Link::Resolved(resolved);
        }

        Ok(self.links[index].value())
    }

    /// Stores `value` as already resolved; no lookup will happen.
    pub fn set_association(&mut self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let index = self.association_index(name)?;
        self.links[index] = Link::Resolved(value.into());
        Ok(())
    }

    /// Stores a raw identity or embedded value, to be resolved on the next
    /// read, the same as ingesting it.
    pub fn assign_association(&mut self, name: &str, raw: impl Into<Value>) -> ModelResult<()> {
        let index = self.association_index(name)?;
        self.links[index] = Link::Unresolved(raw.into());
        Ok(())
    }

    /// Whether the association holds a resolved (or assigned) value.
    pub fn is_association_resolved(&self, name: &str) -> ModelResult<bool> {
        let index = self.association_index(name)?;
        Ok(matches!(self.links[index], Link::Resolved(_)))
    }

    /// The identities every association refers to, without resolving
    /// anything: embedded resources contribute their identity, raw
    /// identities are returned as stored.
    #[must_use]
    pub fn all_associations(&self) -> Map {
        self.schema()
            .associations()
            .iter()
            .zip(&self.links)
            .map(|(spec, link)| {
                let raw = link.value();
                let identities = match spec.cardinality {
                    Cardinality::Single => identity_of(raw),
                    Cardinality::Multiple => match AttributeType::Array.cast(raw.clone()) {
                        Value::Array(items) => items.iter().map(identity_of).collect(),
                        other => other,
                    },
                };
                (Key::symbol(&spec.name), identities)
            })
            .collect()
    }

    fn resolve(&self, spec: &AssociationSpec, raw: &Value) -> ModelResult<Value> {
        match (spec.cardinality, spec.reference) {
            (Cardinality::Single, Reference::Embedded) => Ok(raw.clone()),
            (Cardinality::Multiple, Reference::Embedded) => {
                Ok(AttributeType::Array.cast(raw.clone()))
            }
            (Cardinality::Single, Reference::Identity) => {
                if raw.is_nil() {
                    return Ok(Value::Nil);
                }
                let collection = self.collection(spec)?;
                fetch(spec, collection.as_ref(), raw)
            }
            (Cardinality::Multiple, Reference::Identity) => {
                let Value::Array(identities) = AttributeType::Array.cast(raw.clone()) else {
                    return Ok(Value::Array(Vec::new()));
                };
                if identities.iter().all(Value::is_nil) {
                    return Ok(Value::Array(identities));
                }
                let collection = self.collection(spec)?;
                let resolved = identities
                    .iter()
                    .map(|identity| {
                        if identity.is_nil() {
                            Ok(Value::Nil)
                        } else {
                            fetch(spec, collection.as_ref(), identity)
                        }
                    })
                    .collect::<ModelResult<Vec<_>>>()?;
                Ok(Value::Array(resolved))
            }
        }
    }

    fn collection(&self, spec: &AssociationSpec) -> ModelResult<Arc<dyn Collection>> {
        let service = self.service().ok_or_else(|| ModelError::NoService {
            association: spec.name.clone(),
        })?;
        service
            .collection(&spec.collection)
            .ok_or_else(|| ModelError::MissingCollection {
                association: spec.name.clone(),
                collection: spec.collection.clone(),
            })
    }

    fn association_index(&self, name: &str) -> ModelResult<usize> {
        self.schema()
            .association_index(name)
            .ok_or_else(|| ModelError::UnknownAssociation {
                kind: self.schema().kind().to_string(),
                name: name.to_string(),
            })
    }
}

fn fetch(spec: &AssociationSpec, collection: &dyn Collection, identity: &Value) -> ModelResult<Value> {
    debug!(
        association = %spec.name,
        collection = %spec.collection,
        identity = %identity,
        "resolving association"
    );
    collection.get(identity).map_err(|err| {
        warn!(association = %spec.name, identity = %identity, "lookup failed: {err}");
        ModelError::Lookup(err)
    })
}

fn identity_of(value: &Value) -> Value {
    match value {
        Value::Resource(resource) => resource.identity(),
        other => other.clone(),
    }
}
