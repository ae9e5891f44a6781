//! Edition markers (metadata program)
//!
//! Each marker tracks 248 print editions of a master edition, one bit per
//! edition, most significant bit first within each byte.

use super::{expect_tag, metadata, Account, AccountLayout, ProgramIds};
use crate::core::{AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const EDITION_MARKER_KEY: u8 = 7;
pub const LEDGER_LEN: usize = 31;
pub const EDITIONS_PER_MARKER: u64 = (LEDGER_LEN * 8) as u64;

pub const EDITION: &[u8] = b"edition";

pub type EditionMarker = Account<EditionMarkerData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditionMarkerData {
    pub key: u8,
    pub ledger: [u8; LEDGER_LEN],
}

impl EditionMarkerData {
    /// Whether print `edition` has already been minted
    pub fn edition_taken(&self, edition: u64) -> bool {
        let offset = (edition % EDITIONS_PER_MARKER) as usize;
        let index = offset / 8;
        let mask = 1u8 << (7 - offset % 8);
        self.ledger[index] & mask != 0
    }
}

impl AccountLayout for EditionMarkerData {
    const FAMILY: &'static str = "edition marker";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metadata
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("key", FieldKind::U8)
                .field("ledger", FieldKind::Bytes(LEDGER_LEN))
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, EDITION_MARKER_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let mut ledger = [0u8; LEDGER_LEN];
        ledger.copy_from_slice(record.bytes("ledger")?);
        Ok(Self {
            key: record.u8("key")?,
            ledger,
        })
    }
}

/// Marker covering `edition` of the master edition for `mint`
pub fn seeds(programs: &ProgramIds, mint: &Pubkey, edition: u64) -> SeedSet {
    SeedSet::new(programs.metadata)
        .with(metadata::PREFIX)
        .with(programs.metadata)
        .with(mint)
        .with(EDITION)
        .with((edition / EDITIONS_PER_MARKER).to_string())
}
