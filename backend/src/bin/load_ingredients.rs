//! Bulk-load ingredients from a JSON array of `{name, measurement_unit}`.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use cap_std::{ambient_authority, fs::Dir};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use foodgram::domain::IngredientImportService;
use foodgram::domain::ports::IngredientImport;
use foodgram::outbound::persistence::{DbPool, DieselIngredientRepository, PoolConfig};
use serde_json::Value;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `load-ingredients` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-ingredients",
    about = "Load ingredients from a JSON file, skipping ones already present",
    version
)]
struct CliArgs {
    /// JSON file holding an array of ingredient objects.
    #[arg(long = "file", value_name = "path", default_value = "data/ingredients.json")]
    file: PathBuf,
    /// Database connection URL. Falls back to `DATABASE_URL` when omitted.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let records = read_records(&args.file)?;
    let database_url = resolve_database_url(args.database_url, env::var("DATABASE_URL").ok())?;
    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .wrap_err("create database pool")?;

    let importer = IngredientImportService::new(Arc::new(DieselIngredientRepository::new(pool)));
    let summary = importer.import(records).await;
    info!(file = %args.file.display(), %summary, "ingredient load complete");
    println!("{summary}");
    Ok(())
}

/// Read and parse the input file; it must hold a JSON array.
fn read_records(path: &Path) -> Result<Vec<Value>> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("input path '{}' must name a file", path.display()))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .wrap_err_with(|| format!("open input directory '{}'", parent.display()))?;
    let raw = directory
        .read_to_string(Path::new(file_name))
        .wrap_err_with(|| format!("read ingredients file '{}'", path.display()))?;
    let parsed: Value = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("parse ingredients file '{}'", path.display()))?;
    match parsed {
        Value::Array(records) => Ok(records),
        other => Err(eyre!(
            "ingredients file '{}' must hold a JSON array, found {}",
            path.display(),
            json_kind(&other)
        )),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    if let Some(value) = explicit {
        if value.trim().is_empty() {
            return Err(eyre!("--database-url must not be empty when provided"));
        }
        return Ok(value);
    }
    match from_env {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(eyre!("DATABASE_URL must not be empty")),
        None => Err(eyre!(
            "database URL missing: set --database-url or DATABASE_URL"
        )),
    }
}
