//! Ping endpoints for reachability probes.
//!
//! `/ping` answers with the minimal pong payload. `/ping/detailed` adds the
//! latency measured from request receipt and echoes the received request
//! headers, which is useful for debugging what a load balancer actually sends.

use std::collections::BTreeMap;
use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Extension, Json,
};
use http::header::USER_AGENT;
use serde::Serialize;

use crate::access_log::iso_timestamp;
use crate::error::AppError;
use crate::middleware::ReceivedAt;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PingResponse {
    /// Always "pong"
    pub message: &'static str,
    pub timestamp: String,
    /// Address the server is bound to
    pub server_address: String,
    /// Originating client address
    pub client_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Milliseconds between request receipt and payload construction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    /// Received request headers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
}

/// Basic reachability probe.
pub async fn ping(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Json<PingResponse> {
    Json(PingResponse {
        message: "pong",
        timestamp: iso_timestamp(),
        server_address: state.config.listen_addr(),
        client_address: addr.ip().to_string(),
        user_agent: user_agent(&headers),
        latency_ms: None,
        headers: None,
    })
}

/// Reachability probe with measured latency and echoed request headers.
pub async fn ping_detailed(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    received_at: Option<Extension<ReceivedAt>>,
    headers: HeaderMap,
) -> Result<Json<PingResponse>, AppError> {
    let Extension(ReceivedAt(received_at)) = received_at
        .ok_or_else(|| AppError::Internal("request receipt time missing".to_string()))?;
    let latency_ms = received_at.elapsed().as_millis() as u64;

    Ok(Json(PingResponse {
        message: "pong",
        timestamp: iso_timestamp(),
        server_address: state.config.listen_addr(),
        client_address: addr.ip().to_string(),
        user_agent: user_agent(&headers),
        latency_ms: Some(latency_ms),
        headers: Some(header_map(&headers)),
    }))
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// Flatten received headers into a sorted name-to-value map.
/// Non-UTF-8 values are replaced lossily; repeated names keep the last value.
fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{HeaderValue, HOST};

    #[test]
    fn header_map_flattens_and_sorts_names() {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("elb-probe/2.0"));
        headers.insert(HOST, HeaderValue::from_static("beacon.internal"));

        let map = header_map(&headers);
        assert_eq!(map.get("host"), Some(&"beacon.internal".to_string()));
        assert_eq!(map.get("user-agent"), Some(&"elb-probe/2.0".to_string()));
        let names: Vec<&String> = map.keys().collect();
        assert_eq!(names, vec!["host", "user-agent"]);
    }

    #[test]
    fn user_agent_is_absent_when_not_sent() {
        assert_eq!(user_agent(&HeaderMap::new()), None);
    }
}
