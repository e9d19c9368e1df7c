//! HTTP route handlers for the probe service.
//!
//! Four named endpoints plus a JSON 404 fallback, all returning
//! `application/json`. Responses carry `Cache-Control: no-store` so load
//! balancers and upstream caches never act on a stale probe.
//!
//! Request tracing is enabled via middleware that generates a unique request ID
//! for each incoming request, allowing correlation of all logs within a request.

pub mod health;
pub mod home;
pub mod ping;

use axum::{
    http::{Method, StatusCode, Uri},
    middleware,
    routing::get,
    Json, Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::set_header::SetResponseHeaderLayer;

use crate::config::CACHE_CONTROL_PROBE;
use crate::error::ErrorBody;
use crate::middleware::{access_log_layer, request_id_layer};
use crate::state::AppState;

/// Creates the Axum router with all routes, probe cache headers, and
/// request logging middleware.
///
/// Routes match on method and path; a mismatched method on a known path
/// falls through to the same 404 as an unknown path.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home::index).fallback(not_found))
        .route("/health", get(health::health).fallback(not_found))
        .route("/ping", get(ping::ping).fallback(not_found))
        .route("/ping/detailed", get(ping::ping_detailed).fallback(not_found))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static(CACHE_CONTROL_PROBE),
        ))
        .with_state(state.clone())
        // Access log - every request is recorded before it is routed
        .layer(middleware::from_fn_with_state(state, access_log_layer))
        // Request ID middleware - creates root span with request_id for correlation
        .layer(middleware::from_fn(request_id_layer))
}

/// Fallback for unmatched routes: JSON 404 naming the method and path.
async fn not_found(method: Method, uri: Uri) -> (StatusCode, Json<ErrorBody>) {
    tracing::debug!(%method, path = %uri.path(), "Route not found");

    let body = ErrorBody::new(
        "Not Found",
        format!("Route {} {} not found", method, uri.path()),
    );
    (StatusCode::NOT_FOUND, Json(body))
}
