//! Request middleware: ID correlation spans and the request access log.
//!
//! `request_id_layer` generates a UUID v4 for each incoming request and
//! creates a tracing span wrapping the request lifecycle, so all logs
//! emitted while handling it carry the request_id field.
//!
//! `access_log_layer` records every request to the configured [`LogSink`]
//! before routing happens, so 404s and handler errors are logged too.

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use http::header::{CONTENT_TYPE, USER_AGENT};
use tracing::Instrument;
use uuid::Uuid;

use crate::access_log::{iso_timestamp, parse_body, LogEntry};
use crate::config::MAX_LOGGED_BODY_BYTES;
use crate::state::AppState;

/// Extension type for accessing the request ID in handlers if needed.
#[derive(Clone, Debug)]
pub struct RequestId(pub Uuid);

/// Extension recording when the request arrived, for latency measurement.
#[derive(Clone, Copy, Debug)]
pub struct ReceivedAt(pub Instant);

/// Middleware that generates a request ID and creates a request span.
///
/// This should be the outermost middleware layer so the span wraps
/// all request processing, including other middleware and handlers.
pub async fn request_id_layer(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri.path();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        duration_ms = tracing::field::Empty,
    );

    let start = Instant::now();

    let mut request = request;
    request.extensions_mut().insert(RequestId(request_id));

    async move {
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        tracing::Span::current().record("duration_ms", duration_ms);
        tracing::info!(
            status = response.status().as_u16(),
            duration_ms,
            "Request completed"
        );

        response
    }
    .instrument(span)
    .await
}

/// Middleware that appends one log entry per request, then routes it.
///
/// The body is buffered (capped at [`MAX_LOGGED_BODY_BYTES`]) so it can be
/// both logged and handed on to the handler. Append failures are reported
/// with a warning and never fail the request.
pub async fn access_log_layer(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let received_at = Instant::now();
    let timestamp = iso_timestamp();
    let method = request.method().to_string();
    let url = request
        .uri()
        .path_and_query()
        .map(|pq| pq.to_string())
        .unwrap_or_else(|| request.uri().path().to_string());
    let client_address = client_address(&request);
    let user_agent = request
        .headers()
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let (parts, body) = request.into_parts();
    let bytes = match axum::body::to_bytes(body, MAX_LOGGED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::warn!(%error, "Failed to buffer request body for logging");
            Bytes::new()
        }
    };
    let content_type = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let body_value = parse_body(content_type, &bytes);

    let entry = LogEntry {
        timestamp,
        method,
        url,
        client_address,
        user_agent,
        body: body_value,
    };

    tracing::debug!(
        method = %entry.method,
        url = %entry.url,
        client = %entry.client_address,
        "Request received"
    );

    if let Err(error) = state.sink.append(&entry).await {
        tracing::warn!(%error, "Failed to append request log entry");
    }

    let mut request = Request::from_parts(parts, Body::from(bytes));
    request.extensions_mut().insert(ReceivedAt(received_at));
    next.run(request).await
}

/// Client IP from the connection info, or "unknown" when the request was
/// not served over a real connection.
fn client_address(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
