//! API route definitions

use super::{handlers::*, ApiState};
use axum::{routing::get, Router};

/// `/whales` is the historical route name, `/listings` an alias
pub fn create_snapshot_routes() -> Router<ApiState> {
    Router::new()
        .route("/whales", get(get_snapshot))
        .route("/listings", get(get_snapshot))
}
