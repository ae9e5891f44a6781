//! Snapshot model and change detection
//!
//! The snapshot is the only state kept between cycles. Listings are held as
//! plain JSON values on the read side so a file written by an older build
//! (or by hand) still loads; only the count and, in content mode, the values
//! themselves take part in change detection.

mod file;

pub use file::JsonSnapshotStore;

use crate::pipeline::Listing;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(alias = "whales")]
    pub listings: Vec<serde_json::Value>,
    #[serde(rename = "validWhales")]
    pub count: usize,
}

impl Snapshot {
    pub fn from_listings(listings: &[Listing]) -> Result<Self, serde_json::Error> {
        let listings = listings
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            count: listings.len(),
            listings,
        })
    }
}

/// How a new cycle is compared with the stored snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDetection {
    /// Only a different listing count counts as a change
    #[default]
    Count,
    /// A different count or any difference in listing content
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    FirstRun,
    Unchanged,
    Replace,
}

pub fn decide(previous: Option<&Snapshot>, next: &Snapshot, mode: ChangeDetection) -> Decision {
    let Some(previous) = previous else {
        return Decision::FirstRun;
    };
    let changed = match mode {
        ChangeDetection::Count => previous.count != next.count,
        ChangeDetection::Content => {
            previous.count != next.count || previous.listings != next.listings
        }
    };
    if changed {
        Decision::Replace
    } else {
        Decision::Unchanged
    }
}

/// What a commit did to the stored snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    FirstRun { count: usize },
    Unchanged { count: usize },
    Replaced {
        previous_count: usize,
        count: usize,
        history_file: PathBuf,
    },
}
