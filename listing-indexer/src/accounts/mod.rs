//! Typed account records for the auction-house programs
//!
//! Every family implements [`AccountLayout`]; [`Account::from_raw`] is the only
//! way to build a typed record from fetched bytes. It checks the owning
//! program, then the family's tag or size, then decodes.

pub mod auction;
pub mod auction_extended;
pub mod auction_manager;
pub mod bidder_metadata;
pub mod edition_marker;
pub mod metadata;
pub mod payout_ticket;
pub mod safety_deposit_box;
pub mod safety_deposit_config;
pub mod store;
pub mod store_config;
pub mod vault;

pub use auction::{Auction, AuctionData, AuctionState, PriceFloor};
pub use auction_extended::{AuctionExtended, AuctionExtendedData};
pub use auction_manager::{AuctionManager, AuctionManagerData, AuctionManagerStatus};
pub use bidder_metadata::{BidderMetadata, BidderMetadataData};
pub use edition_marker::{EditionMarker, EditionMarkerData};
pub use metadata::{Metadata, MetadataData};
pub use payout_ticket::{PayoutTicket, PayoutTicketData};
pub use safety_deposit_box::{SafetyDepositBox, SafetyDepositBoxData};
pub use safety_deposit_config::{SafetyDepositConfig, SafetyDepositConfigData};
pub use store_config::{StoreConfig, StoreConfigData};
pub use vault::{Vault, VaultData, VaultState};

use crate::core::{pubkey_string, AccountError, AddressDeriver, DecodeError, DerivationError, RawAccount, SeedSet};
use crate::schema::{self, Record, Schema, Value};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

/// Program ids of the four programs whose accounts are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramIds {
    pub metaplex: Pubkey,
    pub auction: Pubkey,
    pub vault: Pubkey,
    pub metadata: Pubkey,
}

/// Layout description and field mapping for one account family
pub trait AccountLayout: Sized {
    const FAMILY: &'static str;

    /// Program that must own accounts of this family
    fn owner(programs: &ProgramIds) -> Pubkey;

    fn schema() -> &'static Schema;

    /// Tag or exact-size check, run before decoding
    fn check_layout(data: &[u8]) -> Result<(), AccountError>;

    fn from_record(record: &Record) -> Result<Self, DecodeError>;
}

/// A decoded account together with where it came from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account<T> {
    #[serde(rename = "pubkey", with = "pubkey_string")]
    pub address: Pubkey,
    #[serde(with = "pubkey_string")]
    pub owner: Pubkey,
    pub data: T,
}

impl<T: AccountLayout> Account<T> {
    pub fn from_raw(raw: &RawAccount, programs: &ProgramIds) -> Result<Self, AccountError> {
        let expected = T::owner(programs);
        if raw.owner != expected {
            return Err(AccountError::WrongOwner {
                family: T::FAMILY,
                expected,
                actual: raw.owner,
            });
        }

        T::check_layout(&raw.data)?;

        let data = schema::decode(T::schema(), &raw.data)
            .and_then(|record| T::from_record(&record))
            .map_err(|source| AccountError::Decode {
                family: T::FAMILY,
                source,
            })?;

        Ok(Self {
            address: raw.address,
            owner: raw.owner,
            data,
        })
    }
}

/// Re-derive an address from its seeds and compare it with the fetched one.
pub fn verify_address(
    deriver: &dyn AddressDeriver,
    seeds: &SeedSet,
    address: &Pubkey,
) -> Result<bool, DerivationError> {
    Ok(deriver.derive_set(seeds)? == *address)
}

pub(crate) fn expect_tag(family: &'static str, data: &[u8], tag: u8) -> Result<(), AccountError> {
    match data.first() {
        Some(found) if *found == tag => Ok(()),
        Some(found) => Err(AccountError::IncompatibleLayout {
            family,
            reason: format!("tag {found}, expected {tag}"),
        }),
        None => Err(AccountError::IncompatibleLayout {
            family,
            reason: "empty account data".to_string(),
        }),
    }
}

pub(crate) fn expect_size(family: &'static str, data: &[u8], size: usize) -> Result<(), AccountError> {
    if data.len() == size {
        Ok(())
    } else {
        Err(AccountError::IncompatibleLayout {
            family,
            reason: format!("{} bytes, expected exactly {size}", data.len()),
        })
    }
}

pub(crate) fn pubkey(record: &Record, name: &str) -> Result<Pubkey, DecodeError> {
    record.address(name).map(Pubkey::new_from_array)
}

pub(crate) fn opt_uint(record: &Record, name: &str) -> Result<Option<u64>, DecodeError> {
    optional(record, name, "unsigned integer", Value::as_uint)
}

pub(crate) fn opt_int(record: &Record, name: &str) -> Result<Option<i64>, DecodeError> {
    optional(record, name, "signed integer", Value::as_int)
}

pub(crate) fn optional<'a, T>(
    record: &'a Record,
    name: &str,
    expected: &'static str,
    pick: impl FnOnce(&'a Value) -> Option<T>,
) -> Result<Option<T>, DecodeError> {
    match record.option(name)? {
        None => Ok(None),
        Some(value) => pick(value).map(Some).ok_or_else(|| DecodeError::FieldMismatch {
            field: name.to_string(),
            expected,
        }),
    }
}

/// Fixed-width string fields on chain are NUL padded.
pub(crate) fn trim_padding(s: &str) -> String {
    s.trim_end_matches('\0').to_string()
}

pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidValue {
        field: field.to_string(),
        reason: reason.into(),
    }
}
