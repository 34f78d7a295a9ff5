//! API configuration from environment variables
//!
//! Loaded once at process start (after `dotenv`) and passed down explicitly.

use crate::query_core::StoreConfig;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Configuration for the query API
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Path to SQLite database file (opened read-only)
    pub db_path: String,

    /// Listen address
    pub bind_addr: SocketAddr,

    /// Per storage call timeout in milliseconds (0 disables)
    pub query_timeout_ms: u64,

    /// SQLite busy handler timeout in milliseconds
    pub busy_timeout_ms: u64,

    /// Upper bound on concurrent blocking storage workers
    pub max_blocking_threads: usize,
}

impl ApiConfig {
    /// Load configuration from environment variables
    ///
    /// Environment variables:
    /// - `TSDB_DB_PATH` (default: data/tsdb.db)
    /// - `API_BIND_ADDR` (default: 127.0.0.1:5000)
    /// - `QUERY_TIMEOUT_MS` (default: 0, disabled)
    /// - `SQLITE_BUSY_TIMEOUT_MS` (default: 5000)
    /// - `API_MAX_BLOCKING_THREADS` (default: 64)
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_str = env::var("API_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:5000".to_string());
        let bind_addr = bind_str.parse::<SocketAddr>().map_err(|_| {
            ConfigError::InvalidValue(format!("API_BIND_ADDR is not a socket address: {}", bind_str))
        })?;

        Ok(Self {
            db_path: env::var("TSDB_DB_PATH").unwrap_or_else(|_| "data/tsdb.db".to_string()),

            bind_addr,

            query_timeout_ms: env::var("QUERY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),

            busy_timeout_ms: env::var("SQLITE_BUSY_TIMEOUT_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5_000),

            max_blocking_threads: env::var("API_MAX_BLOCKING_THREADS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(64),
        })
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        (self.query_timeout_ms > 0).then(|| Duration::from_millis(self.query_timeout_ms))
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::new(&self.db_path)
            .with_busy_timeout(Duration::from_millis(self.busy_timeout_ms))
            .with_query_timeout(self.query_timeout())
    }
}
