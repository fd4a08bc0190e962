//! eps-generator - synthetic current/voltage telemetry service
//!
//! Usage:
//!   eps-generator --port 8080
//!   eps-generator --output measurements.jsonl --seed 42
//!   eps-generator --config generator.json

use clap::Parser;
use eps_generator::api::{self, ApiConfig};
use eps_generator::{GenerationController, GeneratorConfig, JsonLinesSink, MeasurementSink, MemorySink, metrics};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "eps-generator")]
#[command(about = "Synthetic electrical telemetry generator with an HTTP control API")]
struct Cli {
    /// Host to bind to
    #[arg(long, env = "EPS_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(short, long, env = "EPS_PORT", default_value = "8080")]
    port: u16,

    /// JSON generator config; defaults apply to anything it leaves out
    #[arg(short, long, env = "EPS_CONFIG")]
    config: Option<PathBuf>,

    /// Append samples to this JSON-lines file instead of keeping them in memory
    #[arg(short, long, env = "EPS_OUTPUT")]
    output: Option<PathBuf>,

    /// Fixed RNG seed for reproducible sessions
    #[arg(long, env = "EPS_SEED")]
    seed: Option<u64>,

    /// Override the tick interval in milliseconds
    #[arg(long, env = "EPS_TICK_MS")]
    tick_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::from_json_file(path)?,
        None => GeneratorConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.tick_interval_ms = tick_ms;
    }
    config.validate()?;

    metrics::init();

    let jsonl = match &cli.output {
        Some(path) => Some(Arc::new(JsonLinesSink::open(path).await?)),
        None => None,
    };
    let sink: Arc<dyn MeasurementSink> = match &jsonl {
        Some(sink) => Arc::clone(sink) as Arc<dyn MeasurementSink>,
        None => Arc::new(MemorySink::new()),
    };
    info!(
        sink = sink.name(),
        circuit = %config.circuit_id,
        tick_ms = config.tick_interval_ms,
        seeded = config.seed.is_some(),
        "generator configured"
    );

    let controller = Arc::new(GenerationController::new(config, sink)?);
    let api_config = ApiConfig {
        host: cli.host,
        port: cli.port,
    };

    for (method, path, desc) in api::api_routes() {
        info!("{:6} {:10} {}", method, path, desc);
    }

    let app = api::router(Arc::clone(&controller));
    let addr = api_config.bind_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, "control API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %err, "failed to install CTRL+C handler");
            }
            info!("shutting down");
        })
        .await?;

    if let Some(summary) = controller.shutdown().await {
        info!(
            emitted = summary.emitted,
            written = summary.written,
            failed = summary.failed,
            "final session drained"
        );
    }
    if let Some(sink) = jsonl {
        sink.close().await?;
    }
    info!("goodbye");
    Ok(())
}
