//! Read-only HTTP surface over the current snapshot

mod handlers;
mod routes;

pub use routes::create_snapshot_routes;

use crate::config::ApiConfig;
use crate::core::SnapshotStore;
use anyhow::Result;
use axum::{routing::get, Router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared API state
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn SnapshotStore>,
}

impl ApiState {
    pub fn new(store: Arc<dyn SnapshotStore>) -> Self {
        Self { store }
    }
}

/// Start the API server
pub async fn start_server(
    store: Arc<dyn SnapshotStore>,
    config: &ApiConfig,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = create_app(ApiState::new(store), config.enable_cors);

    let addr = config.socket_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    Ok(handle)
}

pub fn create_app(state: ApiState, enable_cors: bool) -> Router {
    let app = Router::new()
        .merge(create_snapshot_routes())
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
    } else {
        app
    }
}
