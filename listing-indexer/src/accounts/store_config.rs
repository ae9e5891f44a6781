//! Store configs (metaplex program)

use super::{auction_manager, expect_tag, optional, Account, AccountLayout, ProgramIds};
use crate::core::{AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema, Value};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const STORE_CONFIG_KEY: u8 = 15;
pub const CONFIG: &[u8] = b"config";

pub type StoreConfig = Account<StoreConfigData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreConfigData {
    pub key: u8,
    pub settings_uri: Option<String>,
}

impl AccountLayout for StoreConfigData {
    const FAMILY: &'static str = "store config";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metaplex
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("key", FieldKind::U8)
                .field("settingsUri", FieldKind::option(FieldKind::String))
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, STORE_CONFIG_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            key: record.u8("key")?,
            settings_uri: optional(record, "settingsUri", "string", Value::as_str)?
                .map(str::to_string),
        })
    }
}

pub fn seeds(programs: &ProgramIds, store: &Pubkey) -> SeedSet {
    SeedSet::new(programs.metaplex)
        .with(auction_manager::PREFIX)
        .with(programs.metaplex)
        .with(CONFIG)
        .with(store)
}
