//! Auction accounts (auction program)
//!
//! Auctions carry no tag byte, so only ownership and the minimum length are
//! checked before decoding.

use super::{invalid, opt_int, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const PREFIX: &[u8] = b"auction";
pub const EXTENDED: &[u8] = b"extended";

pub type Auction = Account<AuctionData>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuctionState {
    Created,
    Started,
    Ended,
}

impl TryFrom<u8> for AuctionState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Created,
            1 => Self::Started,
            2 => Self::Ended,
            other => return Err(invalid("state", format!("unknown auction state {other}"))),
        })
    }
}

/// Reserve price of an auction. The minimum amount lives in the first eight
/// bytes of the on-chain hash field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PriceFloor {
    None,
    Minimum {
        #[serde(rename = "minPrice")]
        min_price: u64,
    },
    BlindedPrice { hash: [u8; 32] },
}

impl PriceFloor {
    fn from_parts(kind: u8, hash: &[u8]) -> Result<Self, DecodeError> {
        let hash: [u8; 32] = hash
            .try_into()
            .map_err(|_| invalid("priceFloor.hash", "expected 32 bytes"))?;
        Ok(match kind {
            0 => PriceFloor::None,
            1 => {
                let mut amount = [0u8; 8];
                amount.copy_from_slice(&hash[..8]);
                PriceFloor::Minimum {
                    min_price: u64::from_le_bytes(amount),
                }
            }
            2 => PriceFloor::BlindedPrice { hash },
            other => return Err(invalid("priceFloor.type", format!("unknown price floor {other}"))),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BidStateType {
    EnglishAuction,
    OpenEdition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bid {
    #[serde(with = "pubkey_string")]
    pub key: Pubkey,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BidState {
    #[serde(rename = "type")]
    pub kind: BidStateType,
    pub bids: Vec<Bid>,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionData {
    #[serde(with = "pubkey_string")]
    pub authority: Pubkey,
    #[serde(with = "pubkey_string")]
    pub token_mint: Pubkey,
    pub last_bid: Option<i64>,
    pub ended_at: Option<i64>,
    pub end_auction_at: Option<i64>,
    pub auction_gap: Option<i64>,
    pub price_floor: PriceFloor,
    pub state: AuctionState,
    pub bid_state: BidState,
}

impl AuctionData {
    /// Effective listing price: the reserve when it is a plain minimum, else zero
    pub fn min_price(&self) -> u64 {
        match self.price_floor {
            PriceFloor::Minimum { min_price } => min_price,
            _ => 0,
        }
    }

    /// Created but never started
    pub fn is_uninitialized(&self) -> bool {
        self.state == AuctionState::Created
    }
}

impl AccountLayout for AuctionData {
    const FAMILY: &'static str = "auction";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.auction
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let price_floor = Schema::new()
                .field("type", FieldKind::U8)
                .field("hash", FieldKind::Bytes(32));
            let bid = Schema::new()
                .field("key", FieldKind::Address)
                .field("amount", FieldKind::U64);
            let bid_state = Schema::new()
                .field("type", FieldKind::U8)
                .field("bids", FieldKind::vec(FieldKind::Struct(bid)))
                .field("max", FieldKind::U64);
            Schema::new()
                .field("authority", FieldKind::Address)
                .field("tokenMint", FieldKind::Address)
                .field("lastBid", FieldKind::option(FieldKind::I64))
                .field("endedAt", FieldKind::option(FieldKind::I64))
                .field("endAuctionAt", FieldKind::option(FieldKind::I64))
                .field("auctionGap", FieldKind::option(FieldKind::I64))
                .field("priceFloor", FieldKind::Struct(price_floor))
                .field("state", FieldKind::U8)
                .field("bidState", FieldKind::Struct(bid_state))
        })
    }

    fn check_layout(_data: &[u8]) -> Result<(), AccountError> {
        Ok(())
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let floor = record.record("priceFloor")?;
        let bid_state = record.record("bidState")?;

        let bids = bid_state
            .array("bids")?
            .iter()
            .map(|bid| {
                let bid = bid.as_record().ok_or_else(|| invalid("bidState.bids", "expected record"))?;
                Ok(Bid {
                    key: pubkey(bid, "key")?,
                    amount: bid.uint("amount")?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let kind = match bid_state.u8("type")? {
            0 => BidStateType::EnglishAuction,
            1 => BidStateType::OpenEdition,
            other => return Err(invalid("bidState.type", format!("unknown bid state {other}"))),
        };

        Ok(Self {
            authority: pubkey(record, "authority")?,
            token_mint: pubkey(record, "tokenMint")?,
            last_bid: opt_int(record, "lastBid")?,
            ended_at: opt_int(record, "endedAt")?,
            end_auction_at: opt_int(record, "endAuctionAt")?,
            auction_gap: opt_int(record, "auctionGap")?,
            price_floor: PriceFloor::from_parts(floor.u8("type")?, floor.bytes("hash")?)?,
            state: AuctionState::try_from(record.u8("state")?)?,
            bid_state: BidState {
                kind,
                bids,
                max: bid_state.uint("max")?,
            },
        })
    }
}

/// Auction address, derived from the vault it sells
pub fn seeds(programs: &ProgramIds, vault: &Pubkey) -> SeedSet {
    SeedSet::new(programs.auction)
        .with(PREFIX)
        .with(programs.auction)
        .with(vault)
}
