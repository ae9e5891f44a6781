//! Shared fixtures: a store with hand-built on-chain accounts

#![allow(dead_code)]

use listing_indexer::accounts::{auction_manager, metadata, store, ProgramIds};
use listing_indexer::adapters::{MockAccountFetcher, SolanaAddressDeriver};
use listing_indexer::core::{AddressDeriver, RawAccount};
use listing_indexer::ListingPipeline;
use solana_sdk::pubkey::Pubkey;
use std::sync::Arc;
use std::time::Duration;

pub const FETCH_TIMEOUT: Duration = Duration::from_millis(200);

/// Little-endian byte writer
#[derive(Default)]
pub struct Bytes(Vec<u8>);

impl Bytes {
    pub fn u8(mut self, v: u8) -> Self {
        self.0.push(v);
        self
    }
    pub fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn u64(mut self, v: u64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn i64(mut self, v: i64) -> Self {
        self.0.extend_from_slice(&v.to_le_bytes());
        self
    }
    pub fn key(mut self, k: &Pubkey) -> Self {
        self.0.extend_from_slice(k.as_ref());
        self
    }
    pub fn raw(mut self, b: &[u8]) -> Self {
        self.0.extend_from_slice(b);
        self
    }
    pub fn pad_to(mut self, len: usize) -> Self {
        self.0.resize(len, 0);
        self
    }
    pub fn string(mut self, s: &str) -> Self {
        self = self.u32(s.len() as u32);
        self.0.extend_from_slice(s.as_bytes());
        self
    }
    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// Knobs for one auction manager and everything hanging off it
#[derive(Debug, Clone)]
pub struct ListingSetup {
    pub manager_key: u8,
    pub manager_status: u8,
    pub auction_state: u8,
    pub floor_type: u8,
    pub min_price: u64,
    pub vault_state: u8,
    pub boxes: usize,
    pub name: String,
    pub with_metadata: bool,
}

impl Default for ListingSetup {
    fn default() -> Self {
        Self {
            manager_key: 10,
            manager_status: 4,
            auction_state: 1,
            floor_type: 1,
            min_price: 2_500,
            vault_state: 1,
            boxes: 1,
            name: "Whale".to_string(),
            with_metadata: true,
        }
    }
}

impl ListingSetup {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }
}

/// Addresses created for one added listing
#[derive(Debug, Clone)]
pub struct Added {
    pub manager: Pubkey,
    pub auction: Pubkey,
    pub vault: Pubkey,
    pub mints: Vec<Pubkey>,
}

pub struct Fixture {
    pub programs: ProgramIds,
    pub owner: Pubkey,
    pub store: Pubkey,
    pub accounts: Vec<RawAccount>,
}

impl Fixture {
    pub fn new() -> Self {
        let programs = ProgramIds {
            metaplex: Pubkey::new_unique(),
            auction: Pubkey::new_unique(),
            vault: Pubkey::new_unique(),
            metadata: Pubkey::new_unique(),
        };
        let owner = Pubkey::new_unique();
        let store = SolanaAddressDeriver
            .derive_set(&store::seeds(&programs, &owner))
            .expect("store address");
        Self {
            programs,
            owner,
            store,
            accounts: Vec::new(),
        }
    }

    pub fn add(&mut self, setup: ListingSetup) -> Added {
        let auction = Pubkey::new_unique();
        let vault = Pubkey::new_unique();
        let manager = SolanaAddressDeriver
            .derive_set(&auction_manager::seeds(&self.programs, &auction))
            .expect("manager address");

        self.accounts.push(RawAccount::new(
            manager,
            self.programs.metaplex,
            manager_bytes(setup.manager_key, &self.store, &auction, &vault, setup.manager_status),
        ));
        self.accounts.push(RawAccount::new(
            auction,
            self.programs.auction,
            auction_bytes(setup.auction_state, setup.floor_type, setup.min_price),
        ));
        self.accounts.push(RawAccount::new(
            vault,
            self.programs.vault,
            vault_bytes(setup.vault_state),
        ));

        let mut mints = Vec::new();
        for i in 0..setup.boxes {
            let mint = Pubkey::new_unique();
            self.accounts.push(RawAccount::new(
                Pubkey::new_unique(),
                self.programs.vault,
                box_bytes(&vault, &mint, i as u8),
            ));
            if setup.with_metadata {
                let address = self.metadata_address(&mint);
                let name = format!("{} #{}", setup.name, i);
                self.accounts.push(RawAccount::new(
                    address,
                    self.programs.metadata,
                    metadata_bytes(&mint, &name),
                ));
            }
            mints.push(mint);
        }

        Added {
            manager,
            auction,
            vault,
            mints,
        }
    }

    pub fn metadata_address(&self, mint: &Pubkey) -> Pubkey {
        SolanaAddressDeriver
            .derive_set(&metadata::seeds(&self.programs, mint))
            .expect("metadata address")
    }

    pub fn fetcher(&self) -> MockAccountFetcher {
        MockAccountFetcher::new().with_accounts(self.accounts.iter().cloned())
    }

    pub fn pipeline(&self, fetcher: MockAccountFetcher) -> ListingPipeline {
        ListingPipeline::new(
            Arc::new(fetcher),
            Arc::new(SolanaAddressDeriver),
            self.programs,
            self.owner,
            FETCH_TIMEOUT,
        )
    }
}

pub fn manager_bytes(key: u8, store: &Pubkey, auction: &Pubkey, vault: &Pubkey, status: u8) -> Vec<u8> {
    Bytes::default()
        .u8(key)
        .key(store)
        .key(&Pubkey::new_unique())
        .key(auction)
        .key(vault)
        .key(&Pubkey::new_unique())
        .u8(status)
        .u64(1)
        .u64(0)
        .u8(0)
        .build()
}

pub fn auction_bytes(state: u8, floor_type: u8, min_price: u64) -> Vec<u8> {
    let mut hash = [0u8; 32];
    hash[..8].copy_from_slice(&min_price.to_le_bytes());
    let mut bytes = Bytes::default()
        .key(&Pubkey::new_unique())
        .key(&Pubkey::new_unique())
        .u8(0)
        .u8(0)
        .u8(0)
        .u8(0)
        .u8(floor_type);
    for b in hash {
        bytes = bytes.u8(b);
    }
    bytes.u8(state).u8(0).u32(0).u64(0).build()
}

pub fn vault_bytes(state: u8) -> Vec<u8> {
    let mut bytes = Bytes::default().u8(3);
    for _ in 0..5 {
        bytes = bytes.key(&Pubkey::new_unique());
    }
    bytes
        .u8(0)
        .key(&Pubkey::new_unique())
        .u8(1)
        .u8(state)
        .u64(0)
        .build()
}

pub fn box_bytes(vault: &Pubkey, mint: &Pubkey, order: u8) -> Vec<u8> {
    Bytes::default()
        .u8(1)
        .key(vault)
        .key(mint)
        .key(&Pubkey::new_unique())
        .u8(order)
        .build()
}

pub fn metadata_bytes(mint: &Pubkey, name: &str) -> Vec<u8> {
    Bytes::default()
        .u8(4)
        .key(&Pubkey::new_unique())
        .key(mint)
        .string(name)
        .string("WHL")
        .string("https://arweave.net/whale")
        .u16(250)
        .u8(0)
        .u8(0)
        .u8(1)
        .u8(0)
        .build()
}
