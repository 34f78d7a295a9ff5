//! HTTP server and API handlers.
//!
//! GET /api/total_supply_borrow - windowed aggregate supply/borrow series.
//! GET /api/kylix_token - windowed token price series.
//! GET /api/pools_data - windowed per-asset pool series (optional asset_id).
//! GET /api/interest_rate_model - full interest-rate curve.
//! GET /api/health - liveness check.

mod handlers;

use crate::query_core::QueryEngine;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Application state shared across handlers.
pub struct AppState {
    pub engine: QueryEngine,
}

/// Build the API router with permissive CORS.
pub fn router(engine: QueryEngine) -> Router {
    let state = Arc::new(AppState { engine });

    Router::new()
        .route("/api/health", get(handlers::health_handler))
        .route("/api/total_supply_borrow", get(handlers::total_supply_borrow_handler))
        .route("/api/kylix_token", get(handlers::kylix_token_handler))
        .route("/api/pools_data", get(handlers::pools_data_handler))
        .route("/api/interest_rate_model", get(handlers::interest_rate_model_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the API until ctrl-c.
pub async fn run_server(engine: QueryEngine, addr: SocketAddr) -> std::io::Result<()> {
    let app = router(engine);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("✅ Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("🛑 Shutdown signal received, draining connections...");
}
