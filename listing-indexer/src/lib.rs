//! Auction listing indexer
//!
//! Polls the auction-house programs of one store, joins each auction manager
//! to its auction, vault, safety deposit boxes and token metadata, and keeps
//! the resulting listings in a JSON snapshot served over HTTP.

pub mod accounts;
pub mod adapters;
pub mod api;
pub mod config;
pub mod core;
pub mod logging;
pub mod pipeline;
pub mod scheduler;
pub mod schema;
pub mod snapshot;

// Re-export commonly used types
pub use config::IndexerConfig;
pub use crate::core::{IndexerError, IndexerResult};
pub use pipeline::{CycleReport, Listing, ListingPipeline};
pub use scheduler::PollingScheduler;
pub use snapshot::{JsonSnapshotStore, Snapshot};
