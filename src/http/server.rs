//! HTTP server startup logic.

use std::net::SocketAddr;

use axum::Router;

use crate::config::AppConfig;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address '{addr}': {source}")]
    InvalidAddr {
        addr: String,
        source: std::net::AddrParseError,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start the HTTP server and block until it shuts down.
///
/// Logs the bound address and the full URL of every endpoint so operators
/// can point a load balancer at the service without reading the source.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr: SocketAddr = config
        .listen_addr()
        .parse()
        .map_err(|source| ServerError::InvalidAddr {
            addr: config.listen_addr(),
            source,
        })?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;

    tracing::info!(%local, environment = %config.environment, "Starting HTTP server");
    tracing::info!("Health check: http://{}/health", local);
    tracing::info!("Ping endpoint: http://{}/ping", local);
    tracing::info!("Detailed ping: http://{}/ping/detailed", local);
    tracing::info!(
        "Request logs will be saved to: {}",
        config.log_dir.display()
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown::shutdown_signal())
    .await?;

    Ok(())
}
