//! API integration tests

mod common;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use common::{Fixture, ListingSetup};
use listing_indexer::api::{create_app, ApiState};
use listing_indexer::core::SnapshotStore;
use listing_indexer::snapshot::{ChangeDetection, JsonSnapshotStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

fn create_test_api() -> Result<(Router, Arc<JsonSnapshotStore>, TempDir)> {
    let temp_dir = TempDir::new()?;
    let store = Arc::new(JsonSnapshotStore::new(
        temp_dir.path().join("ywhales.json"),
        temp_dir.path().join("ywhales_history"),
        "ywhales_",
        ChangeDetection::Count,
    ));
    let app = create_app(ApiState::new(store.clone()), true);
    Ok((app, store, temp_dir))
}

async fn get(app: Router, uri: &str) -> Result<(StatusCode, Option<String>, Vec<u8>)> {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty())?)
        .await?;
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap_or_default().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, content_type, body.to_vec()))
}

#[tokio::test]
async fn snapshot_route_is_404_before_first_cycle() -> Result<()> {
    let (app, _store, _dir) = create_test_api()?;

    let (status, _, body) = get(app, "/whales").await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.is_empty());
    Ok(())
}

#[tokio::test]
async fn snapshot_route_serves_stored_bytes() -> Result<()> {
    let (app, store, _dir) = create_test_api()?;
    let mut fixture = Fixture::new();
    fixture.add(ListingSetup::default());
    let report = fixture.pipeline(fixture.fetcher()).build_listings().await?;
    store.commit(&report.listings).await?;

    let stored = store.read_raw().await.expect("snapshot");
    for uri in ["/whales", "/listings"] {
        let (status, content_type, body) = get(app.clone(), uri).await?;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, stored);
    }

    let json: serde_json::Value = serde_json::from_slice(&stored)?;
    assert_eq!(json["validWhales"], 1);
    Ok(())
}

#[tokio::test]
async fn health_check() -> Result<()> {
    let (app, _store, _dir) = create_test_api()?;

    let (status, _, body) = get(app, "/health").await?;

    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body)?;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "listing-indexer");
    Ok(())
}

#[tokio::test]
async fn unknown_route_is_404() -> Result<()> {
    let (app, _store, _dir) = create_test_api()?;
    let (status, _, _) = get(app, "/markets").await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}
