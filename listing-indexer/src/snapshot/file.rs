//! JSON file backed snapshot store
//!
//! The current snapshot lives at a fixed path and is replaced by writing a
//! sibling temp file and renaming it over the old one, so readers only ever
//! see a complete file. History copies hold the previous file's bytes
//! unchanged.

use super::{decide, ChangeDetection, CommitOutcome, Decision, Snapshot};
use crate::core::{SnapshotError, SnapshotStore};
use crate::pipeline::Listing;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct JsonSnapshotStore {
    path: PathBuf,
    history_dir: PathBuf,
    history_prefix: String,
    mode: ChangeDetection,
    write_lock: Mutex<()>,
}

impl JsonSnapshotStore {
    pub fn new(
        path: impl Into<PathBuf>,
        history_dir: impl Into<PathBuf>,
        history_prefix: impl Into<String>,
        mode: ChangeDetection,
    ) -> Self {
        Self {
            path: path.into(),
            history_dir: history_dir.into(),
            history_prefix: history_prefix.into(),
            mode,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn history_dir(&self) -> &Path {
        &self.history_dir
    }

    fn parse(&self, bytes: &[u8]) -> Option<Snapshot> {
        match serde_json::from_slice(bytes) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(
                    "Ignoring unreadable snapshot {}: {}",
                    self.path.display(),
                    SnapshotError::Unreadable(e.to_string())
                );
                None
            }
        }
    }

    async fn read_current(&self) -> Option<Vec<u8>> {
        match fs::read(&self.path).await {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!("Failed to read snapshot {}: {}", self.path.display(), e);
                None
            }
        }
    }

    async fn write_current(&self, bytes: &[u8]) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot.json".to_string());
        let temp = self.path.with_file_name(format!(".{file_name}.tmp"));

        let mut file = fs::File::create(&temp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &self.path).await?;
        Ok(())
    }

    /// Write `bytes` to a new timestamped file in the history directory,
    /// adding a `_N` suffix when the name is already taken
    async fn write_history(&self, bytes: &[u8]) -> Result<PathBuf, SnapshotError> {
        fs::create_dir_all(&self.history_dir).await?;

        let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 {
                format!("{}{}.json", self.history_prefix, stamp)
            } else {
                format!("{}{}_{}.json", self.history_prefix, stamp, attempt)
            };
            let candidate = self.history_dir.join(name);

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
                .await
            {
                Ok(mut file) => {
                    file.write_all(bytes).await?;
                    file.sync_all().await?;
                    return Ok(candidate);
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> Option<Snapshot> {
        let bytes = self.read_current().await?;
        self.parse(&bytes)
    }

    async fn commit(&self, listings: &[Listing]) -> Result<CommitOutcome, SnapshotError> {
        let _guard = self.write_lock.lock().await;

        let next = Snapshot::from_listings(listings)?;
        let previous_bytes = self.read_current().await;
        let previous = previous_bytes.as_deref().and_then(|bytes| self.parse(bytes));

        match decide(previous.as_ref(), &next, self.mode) {
            Decision::FirstRun => {
                self.write_current(&serde_json::to_vec(&next)?).await?;
                info!("Wrote first snapshot with {} listings", next.count);
                Ok(CommitOutcome::FirstRun { count: next.count })
            }
            Decision::Unchanged => Ok(CommitOutcome::Unchanged { count: next.count }),
            Decision::Replace => {
                let previous_count = previous.map(|p| p.count).unwrap_or_default();
                let history_file = self
                    .write_history(previous_bytes.as_deref().unwrap_or_default())
                    .await?;
                self.write_current(&serde_json::to_vec(&next)?).await?;
                info!(
                    "Snapshot changed from {} to {} listings, previous kept at {}",
                    previous_count,
                    next.count,
                    history_file.display()
                );
                Ok(CommitOutcome::Replaced {
                    previous_count,
                    count: next.count,
                    history_file,
                })
            }
        }
    }

    async fn read_raw(&self) -> Option<Vec<u8>> {
        self.read_current().await
    }
}
