use pretty_assertions::assert_eq;
use resmodel_cli::{FixtureCollection, inspect, load_document, load_fixtures, load_schema};
use resmodel_model::{Collection, Key, Map, Service, Value};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

const SCHEMA: &str = r#"{
    "kind": "server",
    "identity": { "name": "id" },
    "attributes": [
        { "name": "flavor", "aliases": "flavorRef", "squash": "id" },
        { "name": "ram", "type": "integer" },
        { "name": "state", "default": "pending" }
    ],
    "associations": [
        { "name": "volumes", "collection": "volumes", "magnitude": "many", "type": "identity" }
    ],
    "ignored": ["links"]
}"#;

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn symbols(pairs: Vec<(&str, Value)>) -> Map {
    pairs
        .into_iter()
        .map(|(name, value)| (Key::symbol(name), value))
        .collect()
}

// ── Loading ──────────────────────────────────────────────────────

#[test]
fn loads_schema_definition() {
    let dir = TempDir::new().unwrap();
    let schema = load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap();
    assert_eq!(schema.kind(), "server");
    assert_eq!(schema.attributes().len(), 4);
    assert!(schema.is_ignored("links"));
}

#[test]
fn missing_schema_file_names_the_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");
    let err = load_schema(&path).unwrap_err();
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn invalid_schema_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "schema.json",
        r#"{"kind": "x", "attributes": [{"name": "a"}, {"name": "a"}]}"#,
    );
    let err = load_schema(&path).unwrap_err();
    assert!(format!("{err:#}").contains("attribute `a` is declared twice"));
}

#[test]
fn document_must_be_an_object() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "input.json", "[1, 2]");
    assert!(load_document(&path).is_err());
}

#[test]
fn fixtures_become_collections() {
    let dir = TempDir::new().unwrap();
    let path = write(
        &dir,
        "fixtures.json",
        r#"{"volumes": [{"id": "v1", "size": 10}], "images": []}"#,
    );
    let collections = load_fixtures(&path).unwrap();
    assert_eq!(collections.names(), vec!["images", "volumes"]);
    assert!(collections.has_collection("volumes"));
}

#[test]
fn fixture_collection_must_be_an_array() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fixtures.json", r#"{"volumes": {"id": "v1"}}"#);
    let err = load_fixtures(&path).unwrap_err();
    assert!(err.to_string().contains("`volumes` is not an array"));
}

#[test]
fn fixture_lookup_matches_on_id() {
    let record = Map::try_from(Value::from(json!({"id": "v1", "size": 10}))).unwrap();
    let collection = FixtureCollection::new(vec![record.clone()]);
    assert_eq!(collection.get(&Value::from("v1")).unwrap(), Value::Map(record));
    assert_eq!(collection.get(&Value::from("v2")).unwrap(), Value::Nil);
}

// ── Inspection ───────────────────────────────────────────────────

#[test]
fn inspect_reports_coerced_attributes_and_identities() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap());
    let document = load_document(&write(
        &dir,
        "input.json",
        r#"{"id": "s1", "flavorRef": {"id": "m1"}, "ram": "512", "links": [], "volumes": ["v1"]}"#,
    ))
    .unwrap();

    let report = inspect(schema, document, None, false).unwrap();
    assert_eq!(report.kind, "server");
    assert!(report.persisted);
    assert_eq!(
        report.attributes,
        symbols(vec![
            ("id", Value::from("s1")),
            ("flavor", Value::from("m1")),
            ("ram", Value::Integer(512)),
            ("state", Value::Nil),
        ])
    );
    assert_eq!(report.supplied, vec!["flavor", "id", "ram"]);
    assert_eq!(report.associations, symbols(vec![("volumes", Value::from(vec!["v1"]))]));
}

#[test]
fn inspect_applies_defaults_on_new_document() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap());
    let document = Map::try_from(Value::from(json!({"ram": 1.9}))).unwrap();

    let report = inspect(schema, document, None, false).unwrap();
    assert!(!report.persisted);
    assert_eq!(
        report.attributes.get(&Key::symbol("state")),
        Some(&Value::from("pending"))
    );
    assert_eq!(report.attributes.get(&Key::symbol("ram")), Some(&Value::Integer(1)));
}

#[test]
fn inspect_resolves_through_fixtures() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap());
    let fixtures = load_fixtures(&write(
        &dir,
        "fixtures.json",
        r#"{"volumes": [{"id": "v1", "size": 10}, {"id": "v2", "size": 20}]}"#,
    ))
    .unwrap();
    let document = Map::try_from(Value::from(json!({"id": "s1", "volumes": ["v2", "v9"]}))).unwrap();

    let service: Arc<dyn Service> = Arc::new(fixtures);
    let report = inspect(schema, document, Some(service), true).unwrap();

    let expected = Value::Array(vec![Value::from(json!({"id": "v2", "size": 20})), Value::Nil]);
    assert_eq!(report.associations, symbols(vec![("volumes", expected)]));
}

#[test]
fn resolving_without_fixtures_fails() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap());
    let document = Map::try_from(Value::from(json!({"volumes": ["v1"]}))).unwrap();

    let err = inspect(schema, document, None, true).unwrap_err();
    assert!(format!("{err:#}").contains("needs a service"));
}

#[test]
fn report_serializes_with_plain_keys() {
    let dir = TempDir::new().unwrap();
    let schema = Arc::new(load_schema(&write(&dir, "schema.json", SCHEMA)).unwrap());
    let document = Map::try_from(Value::from(json!({"id": "s1", "ram": 4}))).unwrap();

    let report = inspect(schema, document, None, false).unwrap();
    assert_eq!(
        serde_json::to_value(&report).unwrap(),
        json!({
            "kind": "server",
            "persisted": true,
            "attributes": {"id": "s1", "flavor": null, "ram": 4, "state": null},
            "supplied": ["id", "ram"],
            "associations": {"volumes": []}
        })
    );
}
