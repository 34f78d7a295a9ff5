use super::AppState;
use crate::query_core::{QueryError, RawWindowParams, ReferenceTable, SeriesTable};
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use std::sync::Arc;

/// GET /api/health
pub(super) async fn health_handler() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/total_supply_borrow?end_time=&limit=&scale=
pub(super) async fn total_supply_borrow_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    windowed(&state, SeriesTable::TotalSupplyBorrow, pairs).await
}

/// GET /api/kylix_token?end_time=&limit=&scale=
pub(super) async fn kylix_token_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    windowed(&state, SeriesTable::KylixToken, pairs).await
}

/// GET /api/pools_data?end_time=&limit=&scale=&asset_id=
pub(super) async fn pools_data_handler(
    State(state): State<Arc<AppState>>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    windowed(&state, SeriesTable::PoolsData, pairs).await
}

/// GET /api/interest_rate_model
pub(super) async fn interest_rate_model_handler(State(state): State<Arc<AppState>>) -> Response {
    let table = ReferenceTable::InterestRateModel;
    match state.engine.reference(table).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => error_response(table.table_name(), e),
    }
}

/// Repeated keys keep their first value, so `?limit=2&limit=3` is not rejected.
async fn windowed(state: &AppState, table: SeriesTable, pairs: Vec<(String, String)>) -> Response {
    let params = RawWindowParams::from_pairs(pairs);
    match state.engine.windowed(table, &params).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => error_response(table.table_name(), e),
    }
}

fn error_response(table: &str, err: QueryError) -> Response {
    if err.is_client_error() {
        log::warn!("⚠️  Rejected {} request: {}", table, err);
    } else {
        log::error!("❌ {} query failed: {}", table, err);
    }
    err.into_response()
}
