//! Shared fixtures for model tests.

#![allow(dead_code)]

use resmodel_model::{
    AssociationOptions, AttributeOptions, Collection, Collections, Key, LookupError, Map, Model,
    Schema, Value,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Schema exercising every attribute type, alias/squash, defaults and all
/// four association shapes.
pub fn server_schema() -> Arc<Schema> {
    let schema = Schema::builder("server")
        .identity("id", AttributeOptions::new())
        .attribute("key", AttributeOptions::new().alias("keys").squash("id"))
        .attribute("time", AttributeOptions::time())
        .attribute("bool", AttributeOptions::boolean())
        .attribute("float", AttributeOptions::float())
        .attribute("integer", AttributeOptions::integer())
        .attribute("string", AttributeOptions::string())
        .attribute("timestamp", AttributeOptions::timestamp())
        .attribute("array", AttributeOptions::array())
        .attribute("default", AttributeOptions::new().default_value("default_value"))
        .attribute("another_default", AttributeOptions::new().default_value(false))
        .association("one_object", "single_associations", AssociationOptions::new())
        .association("many_objects", "multiple_associations", AssociationOptions::new().many())
        .association(
            "one_identity",
            "single_associations",
            AssociationOptions::new().identity(),
        )
        .association(
            "many_identities",
            "multiple_associations",
            AssociationOptions::new().identity().many(),
        )
        .collections(["single_associations", "multiple_associations"])
        .build()
        .unwrap();
    Arc::new(schema)
}

/// A small related-resource schema: identity plus a name.
pub fn related_schema(kind: &str) -> Arc<Schema> {
    Arc::new(
        Schema::builder(kind)
            .identity("id", AttributeOptions::new())
            .attribute("name", AttributeOptions::string())
            .build()
            .unwrap(),
    )
}

/// A related model with only its identity supplied.
pub fn related(kind: &str, id: &str) -> Model {
    Model::new(related_schema(kind)).with_attributes([("id", Value::from(id))])
}

/// Collection building a fresh related model per lookup and counting calls.
pub struct CountingCollection {
    kind: &'static str,
    calls: Arc<AtomicUsize>,
}

impl Collection for CountingCollection {
    fn get(&self, identity: &Value) -> Result<Value, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let model =
            Model::new(related_schema(self.kind)).with_attributes([("id", identity.clone())]);
        Ok(model.into_value())
    }
}

/// Service wiring plus call counters for each collection.
pub struct Fixture {
    pub service: Arc<Collections>,
    pub single_calls: Arc<AtomicUsize>,
    pub multiple_calls: Arc<AtomicUsize>,
}

impl Fixture {
    pub fn new() -> Self {
        let single_calls = Arc::new(AtomicUsize::new(0));
        let multiple_calls = Arc::new(AtomicUsize::new(0));
        let service = Collections::new()
            .with(
                "single_associations",
                CountingCollection {
                    kind: "single_association",
                    calls: single_calls.clone(),
                },
            )
            .with(
                "multiple_associations",
                CountingCollection {
                    kind: "multiple_association",
                    calls: multiple_calls.clone(),
                },
            );
        Self {
            service: Arc::new(service),
            single_calls,
            multiple_calls,
        }
    }

    /// An empty server model attached to this fixture's service.
    pub fn model(&self) -> Model {
        Model::new(server_schema()).with_service(self.service.clone())
    }

    pub fn single_lookups(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }

    pub fn multiple_lookups(&self) -> usize {
        self.multiple_calls.load(Ordering::SeqCst)
    }
}

/// Builds a mapping with symbol-shaped keys, the shape models produce.
pub fn attrs(pairs: Vec<(&str, Value)>) -> Map {
    pairs
        .into_iter()
        .map(|(name, value)| (Key::symbol(name), value))
        .collect()
}
