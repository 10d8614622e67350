//! resmodel inspection tool
//!
//! Ingests a raw JSON payload into a model described by a JSON schema
//! definition and prints what the model reads back:
//! 1. every attribute after coercion and defaults
//! 2. association identities, or their resolved records with `--resolve`
//!
//! Usage:
//!   resmodel --schema server.json --input payload.json --fixtures lookups.json --resolve

use std::{fs, path::PathBuf, sync::Arc};
use anyhow::{Context, Result};
use clap::Parser;
use resmodel_cli::{inspect, load_document, load_fixtures, load_schema};
use resmodel_model::Service;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "resmodel")]
#[command(about = "Inspect how a raw payload reads back through a resource schema")]
struct Args {
    /// Path to the JSON schema definition
    #[arg(short, long)]
    schema: PathBuf,

    /// Path to the raw JSON document to ingest
    #[arg(short, long)]
    input: PathBuf,

    /// Path to lookup fixtures (collection name -> array of records)
    #[arg(short, long)]
    fixtures: Option<PathBuf>,

    /// Resolve associations instead of listing their identities
    #[arg(short, long)]
    resolve: bool,

    /// Write the report here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pretty-print the report
    #[arg(long)]
    pretty: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let schema = Arc::new(load_schema(&args.schema)?);

    let service = match &args.fixtures {
        Some(path) => {
            let collections = load_fixtures(path)?;
            info!("Loaded fixture collections: {:?}", collections.names());
            schema
                .check_service(&collections)
                .context("Fixtures do not cover the schema's associations")?;
            Some(Arc::new(collections) as Arc<dyn Service>)
        }
        None => None,
    };

    let document = load_document(&args.input)?;
    debug!("Ingesting {} keys", document.len());

    let report = inspect(schema, document, service, args.resolve)?;
    let rendered = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };

    match &args.output {
        Some(path) => {
            fs::write(path, rendered)
                .with_context(|| format!("Failed to write report {}", path.display()))?;
            info!("Report written to {:?}", path);
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
