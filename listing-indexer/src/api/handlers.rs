//! API request handlers

use super::ApiState;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

/// Current snapshot, byte for byte as stored
pub async fn get_snapshot(State(state): State<ApiState>) -> Response {
    match state.store.read_raw().await {
        Some(bytes) => ([(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().timestamp(),
        "service": "listing-indexer"
    }))
}
