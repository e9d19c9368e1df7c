//! Health check endpoint for container orchestration and load balancers.
//!
//! This is a liveness stub: it reports the process as healthy whenever it
//! can respond at all, without probing any dependent resources. Readiness
//! checks belong elsewhere.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::access_log::iso_timestamp;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    /// Always "healthy" while the process responds
    pub status: &'static str,
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub memory_stats: MemoryStats,
    pub environment: String,
}

/// Process memory usage, read from `/proc/self/status` on Linux.
///
/// Both fields are null on platforms without procfs.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub rss_kb: Option<u64>,
    pub vm_size_kb: Option<u64>,
}

impl MemoryStats {
    #[cfg(target_os = "linux")]
    pub fn current() -> Self {
        std::fs::read_to_string("/proc/self/status")
            .map(|contents| Self::from_proc_status(&contents))
            .unwrap_or_default()
    }

    #[cfg(not(target_os = "linux"))]
    pub fn current() -> Self {
        Self::default()
    }

    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    fn from_proc_status(contents: &str) -> Self {
        let mut stats = Self::default();
        for line in contents.lines() {
            if let Some(rest) = line.strip_prefix("VmRSS:") {
                stats.rss_kb = parse_kb(rest);
            } else if let Some(rest) = line.strip_prefix("VmSize:") {
                stats.vm_size_kb = parse_kb(rest);
            }
        }
        stats
    }
}

/// Parse a procfs size field like " 12345 kB".
fn parse_kb(field: &str) -> Option<u64> {
    field
        .trim()
        .trim_end_matches("kB")
        .trim()
        .parse()
        .ok()
}

/// Health check handler.
pub async fn health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy",
        timestamp: iso_timestamp(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        memory_stats: MemoryStats::current(),
        environment: state.config.environment.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proc_status_fields_are_extracted() {
        let contents = "Name:\tbeacon\nVmSize:\t  123456 kB\nVmRSS:\t   7890 kB\nThreads:\t4\n";
        let stats = MemoryStats::from_proc_status(contents);
        assert_eq!(stats.vm_size_kb, Some(123456));
        assert_eq!(stats.rss_kb, Some(7890));
    }

    #[test]
    fn missing_fields_stay_none() {
        let stats = MemoryStats::from_proc_status("Name:\tbeacon\n");
        assert_eq!(stats.rss_kb, None);
        assert_eq!(stats.vm_size_kb, None);
    }

    #[test]
    fn malformed_sizes_stay_none() {
        let stats = MemoryStats::from_proc_status("VmRSS:\tnot-a-number kB\n");
        assert_eq!(stats.rss_kb, None);
    }
}
