//! Aggregation pipeline
//!
//! Joins every auction manager of the configured store to its auction,
//! vault, safety deposit boxes and token metadata, and keeps the managers
//! whose auction is live. Managers are processed one at a time in
//! discovery order. A failure on one manager is recorded and the walk
//! moves on; only failing to locate the store or to list its managers
//! fails the whole cycle.

mod listing;

pub use listing::Listing;

use crate::accounts::{
    auction_manager, metadata, safety_deposit_box, store, Account, AccountLayout, Auction,
    AuctionManager, Metadata, ProgramIds, SafetyDepositBox, Vault, VaultState,
};
use crate::core::{
    AccountError, AccountFetcher, AddressDeriver, DerivationError, IndexerResult, NetworkError,
};
use solana_sdk::pubkey::Pubkey;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Why an auction manager was dropped without producing a listing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error(transparent)]
    Account(#[from] AccountError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Derivation(#[from] DerivationError),

    #[error("{family} account {address} not found")]
    Missing { family: &'static str, address: Pubkey },
}

/// Inclusion-rule outcomes that are not errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    AuctionNotStarted,
    VaultNotListable(VaultState),
    NoSafetyDepositBoxes,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::AuctionNotStarted => write!(f, "auction not started"),
            Exclusion::VaultNotListable(state) => write!(f, "vault is {state:?}"),
            Exclusion::NoSafetyDepositBoxes => write!(f, "vault holds no safety deposit boxes"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedManager {
    pub address: Pubkey,
    pub reason: SkipReason,
}

/// Everything one pass of the pipeline found
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    /// Included listings, in discovery order
    pub listings: Vec<Listing>,
    pub managers_found: usize,
    pub excluded: Vec<(Pubkey, Exclusion)>,
    pub skipped: Vec<SkippedManager>,
}

enum Outcome {
    Listed(Listing),
    Excluded(Exclusion),
}

pub struct ListingPipeline {
    fetcher: Arc<dyn AccountFetcher>,
    deriver: Arc<dyn AddressDeriver>,
    programs: ProgramIds,
    store_owner: Pubkey,
    fetch_timeout: Duration,
}

impl ListingPipeline {
    pub fn new(
        fetcher: Arc<dyn AccountFetcher>,
        deriver: Arc<dyn AddressDeriver>,
        programs: ProgramIds,
        store_owner: Pubkey,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            deriver,
            programs,
            store_owner,
            fetch_timeout,
        }
    }

    pub fn programs(&self) -> &ProgramIds {
        &self.programs
    }

    /// Store address owned by the configured store owner
    pub fn store_address(&self) -> Result<Pubkey, DerivationError> {
        self.deriver
            .derive_set(&store::seeds(&self.programs, &self.store_owner))
    }

    /// Run one full pass. Per-manager failures land in the report; an `Err`
    /// means the managers could not be listed at all.
    pub async fn build_listings(&self) -> IndexerResult<CycleReport> {
        let store = self.store_address()?;
        let raw_managers = self
            .bounded(
                self.fetcher
                    .fetch_by_filters(&self.programs.metaplex, &auction_manager::store_filters(&store)),
            )
            .await?;

        info!("Found {} auction managers for store {}", raw_managers.len(), store);

        let mut report = CycleReport {
            managers_found: raw_managers.len(),
            ..CycleReport::default()
        };

        for raw in &raw_managers {
            let manager = match AuctionManager::from_raw(raw, &self.programs) {
                Ok(manager) => manager,
                Err(e) => {
                    if e.is_deprecated() {
                        debug!("Skipping legacy auction manager {}", raw.address);
                    } else {
                        warn!("Skipping auction manager {}: {}", raw.address, e);
                    }
                    report.skipped.push(SkippedManager {
                        address: raw.address,
                        reason: e.into(),
                    });
                    continue;
                }
            };

            match self.process_manager(&manager).await {
                Ok(Outcome::Listed(listing)) => report.listings.push(listing),
                Ok(Outcome::Excluded(exclusion)) => {
                    debug!("Auction manager {} excluded: {}", manager.address, exclusion);
                    report.excluded.push((manager.address, exclusion));
                }
                Err(reason) => {
                    warn!("Skipping auction manager {}: {}", manager.address, reason);
                    report.skipped.push(SkippedManager {
                        address: manager.address,
                        reason,
                    });
                }
            }
        }

        Ok(report)
    }

    async fn process_manager(&self, manager: &AuctionManager) -> Result<Outcome, SkipReason> {
        let auction: Auction = self.fetch_account(&manager.data.auction).await?;
        let price = auction.data.min_price();
        if auction.data.is_uninitialized() {
            return Ok(Outcome::Excluded(Exclusion::AuctionNotStarted));
        }

        let vault: Vault = self.fetch_account(&manager.data.vault).await?;
        if !vault.data.state.is_listable() {
            return Ok(Outcome::Excluded(Exclusion::VaultNotListable(vault.data.state)));
        }

        let boxes = self.safety_deposit_boxes(&vault.address).await?;
        let Some(first) = boxes.first() else {
            return Ok(Outcome::Excluded(Exclusion::NoSafetyDepositBoxes));
        };

        let metadata_address = self
            .deriver
            .derive_set(&metadata::seeds(&self.programs, &first.data.token_mint))?;
        let metadata: Metadata = self.fetch_account(&metadata_address).await?;

        Ok(Outcome::Listed(Listing {
            metadata,
            price,
            auction,
        }))
    }

    /// Boxes of `vault` in the order the fetcher returned them. Boxes that
    /// fail to decode are dropped; the rest keep their order.
    async fn safety_deposit_boxes(&self, vault: &Pubkey) -> Result<Vec<SafetyDepositBox>, SkipReason> {
        let raw = self
            .bounded(
                self.fetcher
                    .fetch_by_filters(&self.programs.vault, &safety_deposit_box::vault_filters(vault)),
            )
            .await?;

        Ok(raw
            .iter()
            .filter_map(|account| match SafetyDepositBox::from_raw(account, &self.programs) {
                Ok(deposit) => Some(deposit),
                Err(e) => {
                    warn!("Skipping safety deposit box {} of vault {}: {}", account.address, vault, e);
                    None
                }
            })
            .collect())
    }

    async fn fetch_account<T: AccountLayout>(&self, address: &Pubkey) -> Result<Account<T>, SkipReason> {
        let raw = self
            .bounded(self.fetcher.fetch_one(address))
            .await?
            .ok_or(SkipReason::Missing {
                family: T::FAMILY,
                address: *address,
            })?;
        Ok(Account::<T>::from_raw(&raw, &self.programs)?)
    }

    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, NetworkError>>,
    ) -> Result<T, NetworkError> {
        tokio::time::timeout(self.fetch_timeout, call)
            .await
            .map_err(|_| NetworkError::Timeout(self.fetch_timeout))?
    }
}
