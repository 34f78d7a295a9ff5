//! TSDB API - read-only HTTP query service for Kylix time-series metrics
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release --bin tsdb_api
//! ```
//!
//! ## Environment Variables
//!
//! - TSDB_DB_PATH - SQLite database path (default: data/tsdb.db)
//! - API_BIND_ADDR - Listen address (default: 127.0.0.1:5000)
//! - QUERY_TIMEOUT_MS - Per-query timeout, 0 disables (default: 0)
//! - SQLITE_BUSY_TIMEOUT_MS - SQLite busy timeout (default: 5000)
//! - API_MAX_BLOCKING_THREADS - Storage worker pool size (default: 64)
//! - RUST_LOG - Logging level (optional, default: info)

use kylix_tsdb_api::config::ApiConfig;
use kylix_tsdb_api::query_core::{QueryEngine, SqliteSeriesReader};
use kylix_tsdb_api::server::run_server;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = ApiConfig::from_env()?;

    log::info!("🚀 Starting TSDB API");
    log::info!("   ├─ Database: {}", config.db_path);
    log::info!("   ├─ Bind address: {}", config.bind_addr);
    match config.query_timeout() {
        Some(timeout) => log::info!("   ├─ Query timeout: {}ms", timeout.as_millis()),
        None => log::info!("   ├─ Query timeout: disabled"),
    }
    log::info!("   ├─ SQLite busy timeout: {}ms", config.busy_timeout_ms);
    log::info!("   └─ Storage workers: {}", config.max_blocking_threads);

    if !std::path::Path::new(&config.db_path).exists() {
        log::warn!(
            "⚠️  Database file {} does not exist yet, queries will fail until it is created",
            config.db_path
        );
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .max_blocking_threads(config.max_blocking_threads)
        .build()?;

    let reader = SqliteSeriesReader::new(config.store_config());
    let engine = QueryEngine::new(Arc::new(reader));

    runtime.block_on(run_server(engine, config.bind_addr))?;

    log::info!("👋 TSDB API stopped");
    Ok(())
}
