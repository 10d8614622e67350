//! Helpers behind the `resmodel` inspection binary.
//!
//! Loads a schema definition and a raw JSON document, ingests the document
//! into a model and reports what a caller would read back.

use anyhow::{Context, Result, bail};
use resmodel_model::{Collection, Collections, LookupError, Model, Schema, SchemaDefinition, Service};
use resmodel_types::{Key, Map, Value, lookup};
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// What an ingested document reads back as.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Report {
    pub kind: String,
    pub persisted: bool,
    /// Every declared attribute, defaults applied.
    pub attributes: Map,
    /// Names of the attributes the document supplied.
    pub supplied: Vec<String>,
    /// Association identities, or resolved values when requested.
    pub associations: Map,
}

/// Reads and compiles a JSON schema definition.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let definition = SchemaDefinition::from_json(&input)
        .with_context(|| format!("Failed to parse schema {}", path.display()))?;
    let schema = definition.compile().context("Invalid schema definition")?;
    info!(kind = schema.kind(), "Loaded schema from {:?}", path);
    Ok(schema)
}

/// Reads a raw JSON object to ingest.
pub fn load_document(path: &Path) -> Result<Map> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read document {}", path.display()))?;
    Value::map_from_json_str(&input)
        .with_context(|| format!("Failed to decode document {}", path.display()))
}

/// Reads lookup fixtures: a JSON object of collection name to an array of
/// records, each found by its `id` field.
pub fn load_fixtures(path: &Path) -> Result<Collections> {
    let input = fs::read_to_string(path)
        .with_context(|| format!("Failed to read fixtures {}", path.display()))?;
    let table = Value::map_from_json_str(&input)
        .with_context(|| format!("Failed to decode fixtures {}", path.display()))?;

    let mut collections = Collections::new();
    for (name, records) in table {
        let Value::Array(records) = records else {
            bail!("Fixture collection `{}` is not an array", name.as_str());
        };
        let records = records
            .into_iter()
            .map(|record| {
                Map::try_from(record).with_context(|| {
                    format!("Fixture collection `{}` holds a non-object record", name.as_str())
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(collection = name.as_str(), records = records.len(), "Loaded fixtures");
        collections.insert(String::from(name), FixtureCollection { records });
    }
    Ok(collections)
}

/// In-memory collaborator answering lookups from fixture records.
#[derive(Debug, Clone, Default)]
pub struct FixtureCollection {
    records: Vec<Map>,
}

impl FixtureCollection {
    #[must_use]
    pub fn new(records: Vec<Map>) -> Self {
        Self { records }
    }
}

impl Collection for FixtureCollection {
    /// Returns the matching record as a mapping, or nil when none matches.
    fn get(&self, identity: &Value) -> Result<Value, LookupError> {
        Ok(self
            .records
            .iter()
            .find(|record| lookup(record, "id") == Some(identity))
            .map_or(Value::Nil, |record| Value::Map(record.clone())))
    }
}

/// Ingests `document` and builds its [`Report`].
///
/// With `resolve` set, every association is read through `service`, so
/// identity associations are looked up; otherwise only their identities
/// are listed.
pub fn inspect(
    schema: Arc<Schema>,
    document: Map,
    service: Option<Arc<dyn Service>>,
    resolve: bool,
) -> Result<Report> {
    let mut model = Model::new(schema);
    if let Some(service) = service {
        model.set_service(service);
    }
    model.ingest(document);

    let associations = if resolve {
        let names: Vec<String> = model
            .schema()
            .associations()
            .iter()
            .map(|spec| spec.name.clone())
            .collect();
        let mut resolved = Map::new();
        for name in names {
            let value = model
                .association(&name)
                .with_context(|| format!("Failed to resolve association `{name}`"))?;
            resolved.insert(Key::symbol(&name), value.clone());
        }
        resolved
    } else {
        model.all_associations()
    };

    Ok(Report {
        kind: model.schema().kind().to_string(),
        persisted: model.is_persisted(),
        attributes: model.all_attributes(),
        supplied: model
            .attributes()
            .into_keys()
            .map(String::from)
            .collect(),
        associations,
    })
}
