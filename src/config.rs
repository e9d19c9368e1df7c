//! Configuration loading and constants.
//!
//! Configuration comes from environment variables, with CLI flag overrides
//! applied in `main`. Constants define defaults for the listen address,
//! environment name, request log directory, and logging format.

use std::path::PathBuf;

/// Default listen port when `PORT` is not set
pub const DEFAULT_PORT: u16 = 3000;

/// Default bind host when `HOST` is not set
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default environment name when `APP_ENV` is not set (display only,
/// never gates behavior)
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default directory for request log files
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "beacon=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Log format value selecting structured JSON output
pub const LOG_FORMAT_JSON: &str = "json";

/// Cache-Control for probe responses: load balancers and upstream caches
/// must always see a fresh response
pub const CACHE_CONTROL_PROBE: &str = "no-store";

/// Maximum request body bytes captured into the request log
pub const MAX_LOGGED_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host address the server binds to
    pub host: String,
    /// Port the server listens on
    pub port: u16,
    /// Environment name reported by `/` and `/health`
    pub environment: String,
    /// Directory receiving date-partitioned request logs
    pub log_dir: PathBuf,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// Tests pass a closure over a map instead of mutating the process
    /// environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("PORT") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            environment: lookup("APP_ENV").unwrap_or_else(|| DEFAULT_ENVIRONMENT.to_string()),
            log_dir: lookup("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR)),
            logging: LoggingConfig {
                format: lookup("LOG_FORMAT").unwrap_or_else(|| DEFAULT_LOG_FORMAT.to_string()),
            },
        })
    }

    /// The `host:port` address the server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        source: std::num::ParseIntError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.environment, DEFAULT_ENVIRONMENT);
        assert_eq!(config.log_dir, PathBuf::from(DEFAULT_LOG_DIR));
        assert_eq!(config.logging.format, DEFAULT_LOG_FORMAT);
    }

    #[test]
    fn environment_variables_override_defaults() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("HOST", "127.0.0.1"),
            ("APP_ENV", "production"),
            ("LOG_DIR", "/var/log/beacon"),
            ("LOG_FORMAT", "json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.environment, "production");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/beacon"));
        assert_eq!(config.logging.format, LOG_FORMAT_JSON);
    }

    #[test]
    fn invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("PORT", "not-a-port")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidPort { ref value, .. }) if value == "not-a-port"
        ));
    }

    #[test]
    fn listen_addr_joins_host_and_port() {
        let config = AppConfig::from_lookup(lookup_from(&[("PORT", "3100")])).unwrap();
        assert_eq!(config.listen_addr(), "0.0.0.0:3100");
    }
}
