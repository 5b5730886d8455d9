//! Thin front end over the core crates (§6 "CLI surface"): parses flags,
//! loads schema/transform JSON from disk, reads connection parameters from
//! the environment, and delegates everything else to `slicedb_dump` /
//! `slicedb_restore`. Per §7's error policy, a single failure aborts the
//! whole operation; this binary's only job on error is to print one line
//! naming the error kind and exit non-zero.

mod cli;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use slicedb_db::ConnectionConfig;
use slicedb_schema::{Schema, SchemaConfig};

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    if let Err(err) = run().await {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Dump(args) => run_dump(args).await,
        Command::Restore(args) => run_restore(args).await,
        Command::Schema(args) => run_schema(args).await,
        Command::TransformField(args) => run_transform_field(args),
    }
}

async fn run_dump(args: cli::DumpArgs) -> Result<()> {
    let connection = ConnectionConfig::from_env().context("loading database connection parameters")?;
    let schema = load_schema(&args.schema)?;

    let roots = args
        .roots()
        .into_iter()
        .map(|pair| slicedb_schema::Root {
            table: pair.table,
            condition: pair.condition,
        })
        .collect::<Vec<_>>();
    if roots.is_empty() {
        anyhow::bail!("at least one --root <table> <condition> is required");
    }

    let transforms = match &args.transform {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading transform document {}", path.display()))?;
            let config = slicedb_transform::TransformConfig::from_json_str(&text)
                .with_context(|| format!("parsing transform document {}", path.display()))?;
            let pepper = resolve_pepper(args.pepper.as_deref());
            let set = slicedb_transform::TransformSet::build(&config, &pepper)
                .map_err(report::into_anyhow)
                .context("building transform pipeline")?;
            Some(Arc::new(set))
        }
        None => None,
    };

    let options = slicedb_dump::DumpOptions {
        output_path: args.output.clone(),
        roots,
        jobs: args.jobs,
        transforms,
        include_schema: args.include_schema,
        fork_isolation: args.fork_isolation,
    };

    slicedb_dump::run_dump(connection, schema, options)
        .await
        .map_err(report::into_anyhow)
        .context("dump failed")
}

async fn run_restore(args: cli::RestoreArgs) -> Result<()> {
    let connection = ConnectionConfig::from_env().context("loading database connection parameters")?;
    let options = slicedb_restore::RestoreOptions {
        archive_path: args.input.clone(),
        jobs: args.jobs,
        transaction: args.transaction,
    };

    slicedb_restore::run_restore(connection, options)
        .await
        .map_err(report::into_anyhow)
        .context("restore failed")
}

async fn run_schema(args: cli::SchemaArgs) -> Result<()> {
    let schema = load_schema(&args.schema)?;
    println!(
        "{} tables, {} references, {} sequences",
        schema.tables().count(),
        schema.references().count(),
        schema.sequences().count()
    );
    for table in schema.tables() {
        println!(
            "  {} ({} columns, {} outgoing refs, {} incoming refs)",
            table.id,
            table.columns.len(),
            table.references.len(),
            table.reverse_references.len()
        );
    }
    Ok(())
}

fn run_transform_field(args: cli::TransformFieldArgs) -> Result<()> {
    let config_value: Option<serde_json::Value> = args
        .config
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("parsing --config as JSON")?;
    let pepper = resolve_pepper(args.pepper.as_deref());
    let context = slicedb_transform::Context::default();
    let transformer =
        slicedb_transform::transforms::build_transformer(&args.class, config_value.as_ref(), &context, &pepper)
            .map_err(report::into_anyhow)
            .context("building transform")?;

    let input = if args.input == "\\N" { None } else { Some(args.input.as_str()) };
    let output = transformer.transform(input).map_err(report::into_anyhow)?;
    match output {
        Some(value) => println!("{value}"),
        None => println!("\\N"),
    }
    Ok(())
}

fn load_schema(path: &std::path::Path) -> Result<Arc<Schema>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading schema document {}", path.display()))?;
    let config = SchemaConfig::from_json_str(&text).with_context(|| format!("parsing schema document {}", path.display()))?;
    let schema = Schema::from_config(config).map_err(report::into_anyhow).context("validating schema document")?;
    Ok(Arc::new(schema))
}

/// `--pepper` is the user-supplied byte string from §4.4; absent, a fresh
/// random one is generated — a fresh pepper is fine for a one-off dump, but
/// means any reproducibility across dumps depends on passing one explicitly.
fn resolve_pepper(pepper: Option<&str>) -> Vec<u8> {
    match pepper {
        Some(value) => value.as_bytes().to_vec(),
        None => {
            use rand::RngCore;
            let mut bytes = vec![0u8; 32];
            rand::thread_rng().fill_bytes(&mut bytes);
            bytes
        }
    }
}
