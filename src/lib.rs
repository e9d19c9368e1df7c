//! Beacon - HTTP probe service for load balancers.
//!
//! Exposes health, ping, and diagnostic endpoints for load-balancer probing
//! and records every inbound request as one JSON line in a date-partitioned
//! log file.

pub mod access_log;
pub mod config;
pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;
pub mod state;
