//! Snapshot and history store tests

mod common;

use anyhow::Result;
use common::{Fixture, ListingSetup};
use listing_indexer::core::SnapshotStore;
use listing_indexer::snapshot::{ChangeDetection, CommitOutcome, JsonSnapshotStore};
use listing_indexer::Listing;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn store(dir: &TempDir, mode: ChangeDetection) -> JsonSnapshotStore {
    JsonSnapshotStore::new(
        dir.path().join("ywhales.json"),
        dir.path().join("ywhales_history"),
        "ywhales_",
        mode,
    )
}

async fn listings(setups: Vec<ListingSetup>) -> Result<Vec<Listing>> {
    let mut fixture = Fixture::new();
    for setup in setups {
        fixture.add(setup);
    }
    Ok(fixture.pipeline(fixture.fetcher()).build_listings().await?.listings)
}

fn history_files(dir: &Path) -> Vec<std::path::PathBuf> {
    match fs::read_dir(dir) {
        Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn first_run_writes_snapshot_without_history() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    let listings = listings(vec![ListingSetup::named("a"), ListingSetup::named("b")]).await?;

    let outcome = store.commit(&listings).await?;

    assert_eq!(outcome, CommitOutcome::FirstRun { count: 2 });
    let snapshot = store.load().await.expect("snapshot written");
    assert_eq!(snapshot.count, 2);
    assert_eq!(snapshot.listings.len(), 2);
    assert_eq!(snapshot.listings[0]["price"], 2_500);
    assert_eq!(snapshot.listings[1]["metadata"]["data"]["data"]["name"], "b #0");
    assert!(history_files(store.history_dir()).is_empty());
    Ok(())
}

#[tokio::test]
async fn same_count_leaves_file_untouched() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    store.commit(&listings(vec![ListingSetup::named("a")]).await?).await?;

    let before = fs::read(store.path())?;
    let modified = fs::metadata(store.path())?.modified()?;

    // same count, different content
    let outcome = store.commit(&listings(vec![ListingSetup::named("z")]).await?).await?;

    assert_eq!(outcome, CommitOutcome::Unchanged { count: 1 });
    assert_eq!(fs::read(store.path())?, before);
    assert_eq!(fs::metadata(store.path())?.modified()?, modified);
    assert!(history_files(store.history_dir()).is_empty());
    Ok(())
}

#[tokio::test]
async fn count_change_archives_previous_snapshot() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    store.commit(&listings(vec![ListingSetup::named("a")]).await?).await?;
    let previous = fs::read(store.path())?;

    let three = listings(vec![
        ListingSetup::named("a"),
        ListingSetup::named("b"),
        ListingSetup::named("c"),
    ])
    .await?;
    let outcome = store.commit(&three).await?;

    let history = history_files(store.history_dir());
    assert_eq!(history.len(), 1);
    assert_eq!(fs::read(&history[0])?, previous);
    assert_eq!(
        outcome,
        CommitOutcome::Replaced {
            previous_count: 1,
            count: 3,
            history_file: history[0].clone(),
        }
    );

    let name = history[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("ywhales_"));
    assert!(name.ends_with(".json"));

    assert_eq!(store.load().await.expect("current snapshot").count, 3);
    Ok(())
}

#[tokio::test]
async fn shrinking_to_zero_is_a_change() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    store.commit(&listings(vec![ListingSetup::default()]).await?).await?;

    let outcome = store.commit(&[]).await?;

    assert!(matches!(
        outcome,
        CommitOutcome::Replaced {
            previous_count: 1,
            count: 0,
            ..
        }
    ));
    assert_eq!(store.load().await.expect("snapshot").count, 0);
    Ok(())
}

#[tokio::test]
async fn corrupt_snapshot_is_treated_as_absent() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    fs::write(store.path(), b"{\"listings\": [")?;

    assert!(store.load().await.is_none());

    let outcome = store.commit(&listings(vec![ListingSetup::default()]).await?).await?;
    assert_eq!(outcome, CommitOutcome::FirstRun { count: 1 });
    assert!(history_files(store.history_dir()).is_empty());
    assert_eq!(store.load().await.expect("rewritten").count, 1);
    Ok(())
}

#[tokio::test]
async fn legacy_whales_file_is_recognised() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    fs::write(
        store.path(),
        r#"{"whales":[{"findByMint":{},"price":10,"auction":{}}],"validWhales":1}"#,
    )?;

    let snapshot = store.load().await.expect("legacy snapshot");
    assert_eq!(snapshot.count, 1);

    let outcome = store.commit(&listings(vec![ListingSetup::default()]).await?).await?;
    assert_eq!(outcome, CommitOutcome::Unchanged { count: 1 });
    Ok(())
}

#[tokio::test]
async fn content_mode_detects_same_count_edits() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Content);
    let first = listings(vec![ListingSetup::named("a")]).await?;
    store.commit(&first).await?;

    assert_eq!(
        store.commit(&first).await?,
        CommitOutcome::Unchanged { count: 1 }
    );

    let outcome = store.commit(&listings(vec![ListingSetup::named("b")]).await?).await?;
    assert!(matches!(
        outcome,
        CommitOutcome::Replaced {
            previous_count: 1,
            count: 1,
            ..
        }
    ));
    assert_eq!(history_files(store.history_dir()).len(), 1);
    Ok(())
}

#[tokio::test]
async fn read_raw_returns_stored_bytes() -> Result<()> {
    let dir = TempDir::new()?;
    let store = store(&dir, ChangeDetection::Count);
    assert!(store.read_raw().await.is_none());

    store.commit(&listings(vec![ListingSetup::default()]).await?).await?;
    assert_eq!(store.read_raw().await, Some(fs::read(store.path())?));
    Ok(())
}
