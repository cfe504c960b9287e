use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

use crate::types::AppState;

/// GET /health
pub async fn get_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

/// GET /transcript/cache_stats
///
/// Returns parse cache statistics for monitoring.
pub async fn get_cache_stats(State(s): State<Arc<AppState>>) -> Response {
    (StatusCode::OK, Json(s.parse_cache.stats())).into_response()
}

/// POST /transcript/invalidate_cache
pub async fn invalidate_cache(State(s): State<Arc<AppState>>) -> Response {
    info!("POST /transcript/invalidate_cache");
    s.parse_cache.clear();

    (StatusCode::OK, Json(json!({ "message": "Cache invalidated" }))).into_response()
}
