//! Beacon: a minimal HTTP probe service for load balancers.
//!
//! This is the application entry point. It initializes tracing, loads
//! configuration from environment variables (with CLI overrides), creates
//! the request log sink, sets up the Axum router, and starts the HTTP
//! server with graceful shutdown on SIGINT/SIGTERM.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beacon::access_log::FileSink;
use beacon::config::{AppConfig, DEFAULT_LOG_FILTER, LOG_FORMAT_JSON};
use beacon::http::server::start_server;
use beacon::routes::create_router;
use beacon::state::AppState;

/// Beacon: a minimal HTTP probe service for load balancers
#[derive(Parser, Debug)]
#[command(name = "beacon", version, about)]
struct Args {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory for request log files (overrides LOG_DIR)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log level filter (e.g., "beacon=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,

    /// Log output format: "text" or "json" (overrides LOG_FORMAT)
    #[arg(long)]
    log_format: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    // Load configuration, then apply CLI overrides
    let mut config = AppConfig::from_env()?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(log_dir) = args.log_dir {
        config.log_dir = log_dir;
    }
    if let Some(log_format) = args.log_format {
        config.logging.format = log_format;
    }

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.format == LOG_FORMAT_JSON {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(
        port = config.port,
        environment = %config.environment,
        log_dir = %config.log_dir.display(),
        "Loaded configuration"
    );

    // Request log sink: one JSON line per request, date-partitioned files
    let sink = Arc::new(FileSink::new(config.log_dir.clone()));

    // Create application state and router
    let state = AppState::new(config, sink);
    let app = create_router(state.clone());

    // Start server; blocks until SIGINT/SIGTERM
    start_server(app, state.config.as_ref()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
