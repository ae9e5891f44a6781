//! Bidder metadata (auction program), one per bidder per auction

use super::{auction, expect_size, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const DATA_SIZE: usize = 32 + 32 + 8 + 8 + 1;
pub const METADATA: &[u8] = b"metadata";

pub type BidderMetadata = Account<BidderMetadataData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderMetadataData {
    #[serde(with = "pubkey_string")]
    pub bidder_pubkey: Pubkey,
    #[serde(with = "pubkey_string")]
    pub auction_pubkey: Pubkey,
    pub last_bid: u64,
    pub last_bid_timestamp: i64,
    pub cancelled: bool,
}

impl AccountLayout for BidderMetadataData {
    const FAMILY: &'static str = "bidder metadata";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.auction
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("bidderPubkey", FieldKind::Address)
                .field("auctionPubkey", FieldKind::Address)
                .field("lastBid", FieldKind::U64)
                .field("lastBidTimestamp", FieldKind::I64)
                .field("cancelled", FieldKind::Bool)
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_size(Self::FAMILY, data, DATA_SIZE)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            bidder_pubkey: pubkey(record, "bidderPubkey")?,
            auction_pubkey: pubkey(record, "auctionPubkey")?,
            last_bid: record.uint("lastBid")?,
            last_bid_timestamp: record.int("lastBidTimestamp")?,
            cancelled: record.bool("cancelled")?,
        })
    }
}

pub fn seeds(programs: &ProgramIds, auction: &Pubkey, bidder: &Pubkey) -> SeedSet {
    SeedSet::new(programs.auction)
        .with(auction::PREFIX)
        .with(programs.auction)
        .with(auction)
        .with(bidder)
        .with(METADATA)
}
