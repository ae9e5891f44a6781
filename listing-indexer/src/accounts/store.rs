//! Store addresses (metaplex program)
//!
//! Stores are only ever located, never decoded: the indexer needs the store
//! address to select its auction managers.

use super::{auction_manager, ProgramIds};
use crate::core::SeedSet;
use solana_sdk::pubkey::Pubkey;

/// The store address is derived from its owner
pub fn seeds(programs: &ProgramIds, owner: &Pubkey) -> SeedSet {
    SeedSet::new(programs.metaplex)
        .with(auction_manager::PREFIX)
        .with(programs.metaplex)
        .with(owner)
}
