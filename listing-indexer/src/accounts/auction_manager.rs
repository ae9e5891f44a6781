//! Auction manager accounts (metaplex program)

use super::{expect_tag, invalid, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, MemcmpFilter, SeedSet};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

/// Tag of the legacy layout, no longer decoded
pub const AUCTION_MANAGER_V1_KEY: u8 = 7;
pub const AUCTION_MANAGER_V2_KEY: u8 = 10;

pub const STORE_OFFSET: usize = 1;
pub const AUTHORITY_OFFSET: usize = 33;

pub const PREFIX: &[u8] = b"metaplex";

pub type AuctionManager = Account<AuctionManagerData>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuctionManagerStatus {
    Initialized,
    Validated,
    Running,
    Disbursing,
    Finished,
}

impl TryFrom<u8> for AuctionManagerStatus {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Initialized,
            1 => Self::Validated,
            2 => Self::Running,
            3 => Self::Disbursing,
            4 => Self::Finished,
            other => return Err(invalid("status", format!("unknown auction manager status {other}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionManagerState {
    pub status: AuctionManagerStatus,
    pub safety_config_items_validated: u64,
    pub bids_pushed_to_accept_payment: u64,
    pub has_participation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionManagerData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub store: Pubkey,
    #[serde(with = "pubkey_string")]
    pub authority: Pubkey,
    #[serde(with = "pubkey_string")]
    pub auction: Pubkey,
    #[serde(with = "pubkey_string")]
    pub vault: Pubkey,
    #[serde(with = "pubkey_string")]
    pub accept_payment: Pubkey,
    pub state: AuctionManagerState,
}

impl AccountLayout for AuctionManagerData {
    const FAMILY: &'static str = "auction manager";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metaplex
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let state = Schema::new()
                .field("status", FieldKind::U8)
                .field("safetyConfigItemsValidated", FieldKind::U64)
                .field("bidsPushedToAcceptPayment", FieldKind::U64)
                .field("hasParticipation", FieldKind::Bool);
            Schema::new()
                .field("key", FieldKind::U8)
                .field("store", FieldKind::Address)
                .field("authority", FieldKind::Address)
                .field("auction", FieldKind::Address)
                .field("vault", FieldKind::Address)
                .field("acceptPayment", FieldKind::Address)
                .field("state", FieldKind::Struct(state))
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        if data.first() == Some(&AUCTION_MANAGER_V1_KEY) {
            return Err(AccountError::DeprecatedLayout {
                family: Self::FAMILY,
            });
        }
        expect_tag(Self::FAMILY, data, AUCTION_MANAGER_V2_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let state = record.record("state")?;
        Ok(Self {
            key: record.u8("key")?,
            store: pubkey(record, "store")?,
            authority: pubkey(record, "authority")?,
            auction: pubkey(record, "auction")?,
            vault: pubkey(record, "vault")?,
            accept_payment: pubkey(record, "acceptPayment")?,
            state: AuctionManagerState {
                status: AuctionManagerStatus::try_from(state.u8("status")?)?,
                safety_config_items_validated: state.uint("safetyConfigItemsValidated")?,
                bids_pushed_to_accept_payment: state.uint("bidsPushedToAcceptPayment")?,
                has_participation: state.bool("hasParticipation")?,
            },
        })
    }
}

/// Filters selecting every manager attached to `store`. Both layouts keep the
/// store at the same offset, so legacy managers come back too and are
/// rejected by [`Account::from_raw`].
pub fn store_filters(store: &Pubkey) -> Vec<MemcmpFilter> {
    vec![MemcmpFilter::address(STORE_OFFSET, store)]
}

pub fn authority_filters(authority: &Pubkey) -> Vec<MemcmpFilter> {
    vec![
        MemcmpFilter::tag(AUCTION_MANAGER_V2_KEY),
        MemcmpFilter::address(AUTHORITY_OFFSET, authority),
    ]
}

/// The manager address is derived from its auction
pub fn seeds(programs: &ProgramIds, auction: &Pubkey) -> SeedSet {
    SeedSet::new(programs.metaplex).with(PREFIX).with(auction)
}
