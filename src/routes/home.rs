//! Root endpoint describing the service and its probe endpoints.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoPayload {
    pub message: &'static str,
    pub version: &'static str,
    pub endpoints: Endpoints,
    pub server_info: ServerInfo,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoints {
    pub health: &'static str,
    pub ping: &'static str,
    pub detailed_ping: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub address: String,
    pub port: u16,
    pub environment: String,
}

/// Root handler: welcome message, version, and available endpoints.
pub async fn index(State(state): State<AppState>) -> Json<InfoPayload> {
    Json(InfoPayload {
        message: "Welcome to the beacon probe service",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: Endpoints {
            health: "/health",
            ping: "/ping",
            detailed_ping: "/ping/detailed",
        },
        server_info: ServerInfo {
            address: state.config.listen_addr(),
            port: state.config.port,
            environment: state.config.environment.clone(),
        },
    })
}
