//! Convert API Server
//!
//! Reprojects GeoJSON feature collections between EPSG reference systems.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use projection::ReferenceSystemRegistry;
use reproject_common::ReferenceSystemId;
use reproject_engine::{Engine, EngineConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use convert_api::{build_router, AppState};

/// Convert API Server
#[derive(Parser, Debug)]
#[command(name = "convert-api")]
#[command(about = "GeoJSON reprojection service")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8085", env = "CONVERT_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "CONVERT_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Engine configuration file (YAML); REPROJECT_* variables are used when absent
    #[arg(long, env = "CONVERT_CONFIG")]
    config: Option<PathBuf>,

    /// Target reference system when a request does not name one
    #[arg(long, default_value = "EPSG:4326", env = "CONVERT_DEFAULT_TARGET_CRS")]
    default_target_crs: String,

    /// Per-request conversion timeout in seconds
    #[arg(long, default_value_t = 30, env = "CONVERT_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: u64,

    /// Largest accepted request body in megabytes
    #[arg(long, default_value_t = 64, env = "CONVERT_MAX_BODY_MB")]
    max_body_mb: usize,
}

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Build runtime with configured threads
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = runtime_builder
        .build()
        .context("Failed to create Tokio runtime")?;
    runtime.block_on(run_server(args))
}

async fn run_server(args: Args) -> Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    // Initialize Prometheus metrics exporter
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    info!("Prometheus metrics exporter initialized");
    info!("Starting Convert API server");

    let engine_config = match &args.config {
        Some(path) => EngineConfig::from_yaml_file(path)
            .with_context(|| format!("Failed to load engine config {}", path.display()))?,
        None => EngineConfig::from_env(),
    };
    engine_config
        .validate()
        .context("Invalid engine configuration")?;

    let default_target = ReferenceSystemId::parse(&args.default_target_crs)
        .context("Invalid default target reference system")?;

    let registry = Arc::new(ReferenceSystemRegistry::with_defaults());
    if !registry.contains(default_target) {
        anyhow::bail!("Default target {} is not a supported reference system", default_target);
    }

    info!(
        reference_systems = registry.len(),
        default_target = %default_target,
        chunk_size = engine_config.chunk_size,
        elevation = %engine_config.elevation,
        max_features = engine_config.max_features,
        "Engine configured"
    );

    // Initialize application state
    let state = AppState::new(Engine::new(registry, engine_config), default_target)
        .with_request_timeout(Duration::from_secs(args.request_timeout_secs))
        .with_max_body_bytes(args.max_body_mb * 1024 * 1024)
        .with_prometheus(prometheus_handle);

    let app = build_router(Arc::new(state));

    // Parse listen address
    let addr: SocketAddr = args.listen.parse().context("Invalid listen address")?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
