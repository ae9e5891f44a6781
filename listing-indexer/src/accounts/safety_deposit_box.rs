//! Safety deposit boxes (vault program), one per token type held by a vault

use super::{expect_tag, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, MemcmpFilter, SeedSet};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const SAFETY_DEPOSIT_BOX_KEY: u8 = 1;
pub const DATA_SIZE: usize = 98;
pub const VAULT_OFFSET: usize = 1;

pub const PREFIX: &[u8] = b"vault";

pub type SafetyDepositBox = Account<SafetyDepositBoxData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDepositBoxData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub vault: Pubkey,
    #[serde(with = "pubkey_string")]
    pub token_mint: Pubkey,
    /// Token account holding the deposited asset
    #[serde(with = "pubkey_string")]
    pub store: Pubkey,
    pub order: u8,
}

impl AccountLayout for SafetyDepositBoxData {
    const FAMILY: &'static str = "safety deposit box";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.vault
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("key", FieldKind::U8)
                .field("vault", FieldKind::Address)
                .field("tokenMint", FieldKind::Address)
                .field("store", FieldKind::Address)
                .field("order", FieldKind::U8)
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, SAFETY_DEPOSIT_BOX_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            key: record.u8("key")?,
            vault: pubkey(record, "vault")?,
            token_mint: pubkey(record, "tokenMint")?,
            store: pubkey(record, "store")?,
            order: record.u8("order")?,
        })
    }
}

/// Filters selecting every box of `vault`
pub fn vault_filters(vault: &Pubkey) -> Vec<MemcmpFilter> {
    vec![
        MemcmpFilter::tag(SAFETY_DEPOSIT_BOX_KEY),
        MemcmpFilter::address(VAULT_OFFSET, vault),
    ]
}

pub fn seeds(programs: &ProgramIds, vault: &Pubkey, mint: &Pubkey) -> SeedSet {
    SeedSet::new(programs.vault).with(PREFIX).with(vault).with(mint)
}
