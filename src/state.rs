//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::Instant;

use crate::access_log::LogSink;
use crate::config::AppConfig;

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Contains the application configuration, the request log sink, and the
/// process start time used for uptime reporting.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sink: Arc<dyn LogSink>,
    pub started_at: Instant,
}

impl AppState {
    /// Creates a new application state from the given configuration and log sink.
    pub fn new(config: AppConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            started_at: Instant::now(),
        }
    }
}
