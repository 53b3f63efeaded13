//! Reproject a GeoJSON FeatureCollection file.
//!
//! Usage:
//!   reproject-file --input parcels.geojson --from EPSG:32632 [--to EPSG:4326] [--output out.geojson]
//!   reproject-file --input scan.geojson --strip-z

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use projection::ReferenceSystemRegistry;
use reproject_common::{FeatureCollection, ReferenceSystemId};
use reproject_engine::{CancellationToken, ElevationPolicy, Engine, EngineConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "reproject-file")]
#[command(about = "Reproject a GeoJSON FeatureCollection between EPSG reference systems")]
struct Args {
    /// Input GeoJSON FeatureCollection
    #[arg(short, long)]
    input: PathBuf,

    /// Output file (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Source reference system, e.g. EPSG:32632
    #[arg(long, required_unless_present = "strip_z")]
    from: Option<String>,

    /// Target reference system
    #[arg(long, default_value = "EPSG:4326")]
    to: String,

    /// Elevation handling for 3D input: drop, zero or preserve
    #[arg(long)]
    elevation: Option<ElevationPolicy>,

    /// Features processed per batch
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Only remove elevation; do not reproject
    #[arg(long)]
    strip_z: bool,

    /// Pretty-print the output
    #[arg(long)]
    pretty: bool,

    /// Engine configuration file (YAML)
    #[arg(long, env = "REPROJECT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)?,
        None => EngineConfig::from_env(),
    };
    if let Some(policy) = args.elevation {
        config.elevation = policy;
    }
    if let Some(chunk_size) = args.chunk_size {
        config.chunk_size = chunk_size;
    }
    config.validate()?;

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", args.input.display()))?;
    let collection = FeatureCollection::from_json(value)
        .with_context(|| format!("{} is not a GeoJSON FeatureCollection", args.input.display()))?;

    let engine = Engine::new(Arc::new(ReferenceSystemRegistry::with_defaults()), config);
    let cancel = CancellationToken::new();

    let output = if args.strip_z {
        engine.strip_elevation(collection, &cancel)?
    } else {
        let from = args.from.as_deref().context("--from is required")?;
        let source = ReferenceSystemId::parse(from)?;
        let target = ReferenceSystemId::parse(&args.to)?;
        info!(source = %source, target = %target, input = %args.input.display(), "Reprojecting");
        engine.convert_with_cancel(collection, source, target, &cancel)?
    };

    let json = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };

    match &args.output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }

    Ok(())
}
