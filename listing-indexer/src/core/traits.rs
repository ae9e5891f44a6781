//! Core trait abstractions (Ports in Hexagonal Architecture)

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use super::error::{DerivationError, NetworkError, SnapshotError};
use super::types::{MemcmpFilter, RawAccount, SeedSet};
use crate::pipeline::Listing;
use crate::snapshot::{CommitOutcome, Snapshot};

/// Account fetcher port - the network side of the pipeline
#[async_trait]
pub trait AccountFetcher: Send + Sync {
    /// All accounts owned by `program_id` whose data matches every filter
    async fn fetch_by_filters(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, NetworkError>;

    /// A single account, `None` when it does not exist
    async fn fetch_one(&self, address: &Pubkey) -> Result<Option<RawAccount>, NetworkError>;
}

/// Address derivation port - computes program-derived addresses
pub trait AddressDeriver: Send + Sync {
    fn derive(&self, program_id: &Pubkey, seeds: &[Vec<u8>]) -> Result<Pubkey, DerivationError>;

    fn derive_set(&self, set: &SeedSet) -> Result<Pubkey, DerivationError> {
        self.derive(&set.program_id, &set.seeds)
    }
}

/// Snapshot store port - the only state shared between the scheduler and the API
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Current snapshot, `None` when absent or unreadable
    async fn load(&self) -> Option<Snapshot>;

    /// Apply the change-detection rules and persist `listings` if they differ
    async fn commit(&self, listings: &[Listing]) -> Result<CommitOutcome, SnapshotError>;

    /// Current snapshot bytes exactly as stored
    async fn read_raw(&self) -> Option<Vec<u8>>;
}
