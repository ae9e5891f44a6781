//! Auction-extended satellite accounts (auction program)

use super::{auction, expect_size, opt_uint, optional, Account, AccountLayout, ProgramIds};
use crate::core::{AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema, Value};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

/// On-chain allocation, larger than the decoded fields
pub const DATA_SIZE: usize = 8 + 9 + 2 + 200;

pub type AuctionExtended = Account<AuctionExtendedData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionExtendedData {
    pub total_uncancelled_bids: u64,
    pub tick_size: Option<u64>,
    pub gap_tick_size_percentage: Option<u8>,
    pub instant_sale_price: Option<u64>,
    pub name: Option<[u8; 32]>,
}

impl AuctionExtendedData {
    pub fn name_str(&self) -> Option<String> {
        self.name
            .map(|raw| String::from_utf8_lossy(&raw).trim_end_matches('\0').to_string())
    }
}

impl AccountLayout for AuctionExtendedData {
    const FAMILY: &'static str = "auction extended";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.auction
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("totalUncancelledBids", FieldKind::U64)
                .field("tickSize", FieldKind::option(FieldKind::U64))
                .field("gapTickSizePercentage", FieldKind::option(FieldKind::U8))
                .field("instantSalePrice", FieldKind::option(FieldKind::U64))
                .field("name", FieldKind::option(FieldKind::Bytes(32)))
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_size(Self::FAMILY, data, DATA_SIZE)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let gap = opt_uint(record, "gapTickSizePercentage")?
            .map(|v| v as u8);
        let name = optional(record, "name", "byte array", Value::as_bytes)?
            .map(|bytes| {
                let mut name = [0u8; 32];
                name.copy_from_slice(bytes);
                name
            });

        Ok(Self {
            total_uncancelled_bids: record.uint("totalUncancelledBids")?,
            tick_size: opt_uint(record, "tickSize")?,
            gap_tick_size_percentage: gap,
            instant_sale_price: opt_uint(record, "instantSalePrice")?,
            name,
        })
    }
}

/// Keyed by the vault, alongside the auction itself
pub fn seeds(programs: &ProgramIds, vault: &Pubkey) -> SeedSet {
    SeedSet::new(programs.auction)
        .with(auction::PREFIX)
        .with(programs.auction)
        .with(vault)
        .with(auction::EXTENDED)
}
