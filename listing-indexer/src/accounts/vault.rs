//! Token vault accounts (vault program)
//!
//! A vault does not embed its boxes. They are found by address derivation
//! from the vault and each token mint, or by the vault filter in
//! [`super::safety_deposit_box::vault_filters`].

use super::{expect_tag, invalid, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const VAULT_KEY: u8 = 3;
pub const DATA_SIZE: usize = 204;

pub type Vault = Account<VaultData>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VaultState {
    Inactive,
    Active,
    Combined,
    Deactivated,
}

impl VaultState {
    /// Inactive and deactivated vaults never back a listing
    pub fn is_listable(self) -> bool {
        !matches!(self, Self::Inactive | Self::Deactivated)
    }
}

impl TryFrom<u8> for VaultState {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Inactive,
            1 => Self::Active,
            2 => Self::Combined,
            3 => Self::Deactivated,
            other => return Err(invalid("state", format!("unknown vault state {other}"))),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub token_program: Pubkey,
    #[serde(with = "pubkey_string")]
    pub fraction_mint: Pubkey,
    #[serde(with = "pubkey_string")]
    pub authority: Pubkey,
    #[serde(with = "pubkey_string")]
    pub fraction_treasury: Pubkey,
    #[serde(with = "pubkey_string")]
    pub redeem_treasury: Pubkey,
    pub allow_further_share_creation: bool,
    #[serde(with = "pubkey_string")]
    pub pricing_lookup_address: Pubkey,
    pub token_type_count: u8,
    pub state: VaultState,
    pub locked_price_per_share: u64,
}

impl AccountLayout for VaultData {
    const FAMILY: &'static str = "vault";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.vault
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("key", FieldKind::U8)
                .field("tokenProgram", FieldKind::Address)
                .field("fractionMint", FieldKind::Address)
                .field("authority", FieldKind::Address)
                .field("fractionTreasury", FieldKind::Address)
                .field("redeemTreasury", FieldKind::Address)
                .field("allowFurtherShareCreation", FieldKind::Bool)
                .field("pricingLookupAddress", FieldKind::Address)
                .field("tokenTypeCount", FieldKind::U8)
                .field("state", FieldKind::U8)
                .field("lockedPricePerShare", FieldKind::U64)
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, VAULT_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            key: record.u8("key")?,
            token_program: pubkey(record, "tokenProgram")?,
            fraction_mint: pubkey(record, "fractionMint")?,
            authority: pubkey(record, "authority")?,
            fraction_treasury: pubkey(record, "fractionTreasury")?,
            redeem_treasury: pubkey(record, "redeemTreasury")?,
            allow_further_share_creation: record.bool("allowFurtherShareCreation")?,
            pricing_lookup_address: pubkey(record, "pricingLookupAddress")?,
            token_type_count: record.u8("tokenTypeCount")?,
            state: VaultState::try_from(record.u8("state")?)?,
            locked_price_per_share: record.uint("lockedPricePerShare")?,
        })
    }
}
