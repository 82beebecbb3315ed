//! Water Dashboard Server
//!
//! Monthly surface-water area of a reservoir, computed remotely on Earth
//! Engine from the Dynamic World water probability band.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use earth_engine::{ClientConfig, EarthEngineClient, ServiceAccountKey, DEFAULT_API_BASE};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use water_dashboard::config::DashboardConfig;
use water_dashboard::state::AppState;

/// Water Dashboard Server
#[derive(Parser, Debug)]
#[command(name = "water-dashboard")]
#[command(about = "Monthly surface-water area dashboard backed by Earth Engine")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:8501", env = "WD_LISTEN_ADDR")]
    listen: String,

    /// Log level
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Number of worker threads
    #[arg(long, env = "WD_WORKER_THREADS")]
    worker_threads: Option<usize>,

    /// Dashboard configuration file
    #[arg(long, default_value = "config/dashboard.yaml", env = "WD_CONFIG")]
    config: PathBuf,

    /// Secrets file holding GEE_SERVICE_ACCOUNT_KEY
    #[arg(long, default_value = "config/secrets.yaml", env = "WD_SECRETS_FILE")]
    secrets: PathBuf,

    /// Earth Engine cloud project (defaults to the key's project_id)
    #[arg(long, env = "GEE_PROJECT")]
    ee_project: Option<String>,

    /// Earth Engine REST API base URL
    #[arg(long, default_value = DEFAULT_API_BASE, env = "GEE_API_BASE")]
    ee_api_base: String,

    /// Monthly queries in flight per run
    #[arg(long, default_value_t = 1, env = "WD_MAX_CONCURRENT_QUERIES")]
    max_concurrent_queries: usize,

    /// Timeout for each Earth Engine request, in seconds
    #[arg(long, default_value_t = 300, env = "WD_REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: u64,
}

fn main() {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(threads) = args.worker_threads {
        runtime_builder.worker_threads(threads);
    }

    let runtime = match runtime_builder.build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {}", e);
            std::process::exit(1);
        }
    };

    let result = runtime.block_on(run_server(args));
    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run_server(args: Args) -> anyhow::Result<()> {
    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_level(true)
        .json()
        .init();

    info!("Starting water dashboard");

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "Failed to install Prometheus recorder, /metrics disabled");
            None
        }
    };

    let config = DashboardConfig::load(&args.config)?;

    // Credentials are mandatory: without them no run can succeed.
    let key = ServiceAccountKey::load(Some(&args.secrets))?;
    let client = EarthEngineClient::new(
        key,
        ClientConfig {
            api_base: args.ee_api_base.clone(),
            project: args.ee_project.clone(),
            request_timeout: Duration::from_secs(args.request_timeout_secs),
        },
    )
    .context("Failed to create Earth Engine client")?;
    info!(project = %client.project(), "Earth Engine client ready");

    let mut state = AppState::new(config, Arc::new(client))
        .with_max_concurrent_queries(args.max_concurrent_queries);
    if let Some(handle) = metrics {
        state = state.with_metrics(handle);
    }

    let app = water_dashboard::app(Arc::new(state));

    let addr: SocketAddr = args
        .listen
        .parse()
        .with_context(|| format!("Invalid listen address: {}", args.listen))?;

    info!("Water dashboard listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("Server failed")?;

    Ok(())
}
