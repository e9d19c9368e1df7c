//! HTTP server plumbing: startup and graceful shutdown.

pub mod server;
pub mod shutdown;
