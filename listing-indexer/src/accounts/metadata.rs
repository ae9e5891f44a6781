//! Token metadata accounts (metadata program)
//!
//! Name, symbol and uri are stored in fixed-width slots padded with NUL
//! bytes. The padding is stripped when the record is built.

use super::{expect_tag, invalid, optional, pubkey, trim_padding, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema, Value};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const METADATA_KEY: u8 = 4;
pub const PREFIX: &[u8] = b"metadata";

pub type Metadata = Account<MetadataData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Creator {
    #[serde(with = "pubkey_string")]
    pub address: Pubkey,
    pub verified: bool,
    pub share: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub seller_fee_basis_points: u16,
    pub creators: Option<Vec<Creator>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub update_authority: Pubkey,
    #[serde(with = "pubkey_string")]
    pub mint: Pubkey,
    pub data: TokenData,
    pub primary_sale_happened: bool,
    pub is_mutable: bool,
    pub edition_nonce: Option<u8>,
}

impl AccountLayout for MetadataData {
    const FAMILY: &'static str = "metadata";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metadata
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let creator = Schema::new()
                .field("address", FieldKind::Address)
                .field("verified", FieldKind::Bool)
                .field("share", FieldKind::U8);
            let data = Schema::new()
                .field("name", FieldKind::String)
                .field("symbol", FieldKind::String)
                .field("uri", FieldKind::String)
                .field("sellerFeeBasisPoints", FieldKind::U16)
                .field(
                    "creators",
                    FieldKind::option(FieldKind::vec(FieldKind::Struct(creator))),
                );
            Schema::new()
                .field("key", FieldKind::U8)
                .field("updateAuthority", FieldKind::Address)
                .field("mint", FieldKind::Address)
                .field("data", FieldKind::Struct(data))
                .field("primarySaleHappened", FieldKind::Bool)
                .field("isMutable", FieldKind::Bool)
                .field("editionNonce", FieldKind::option(FieldKind::U8))
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, METADATA_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let data = record.record("data")?;
        let creators = optional(data, "creators", "creator list", Value::as_array)?
            .map(|items| items.iter().map(creator).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        Ok(Self {
            key: record.u8("key")?,
            update_authority: pubkey(record, "updateAuthority")?,
            mint: pubkey(record, "mint")?,
            data: TokenData {
                name: trim_padding(data.string("name")?),
                symbol: trim_padding(data.string("symbol")?),
                uri: trim_padding(data.string("uri")?),
                seller_fee_basis_points: data.u16("sellerFeeBasisPoints")?,
                creators,
            },
            primary_sale_happened: record.bool("primarySaleHappened")?,
            is_mutable: record.bool("isMutable")?,
            edition_nonce: optional(record, "editionNonce", "unsigned integer", Value::as_uint)?
                .map(|nonce| nonce as u8),
        })
    }
}

fn creator(value: &Value) -> Result<Creator, DecodeError> {
    let record = value
        .as_record()
        .ok_or_else(|| invalid("data.creators", "expected record"))?;
    Ok(Creator {
        address: pubkey(record, "address")?,
        verified: record.bool("verified")?,
        share: record.u8("share")?,
    })
}

/// Metadata is keyed by its token mint
pub fn seeds(programs: &ProgramIds, mint: &Pubkey) -> SeedSet {
    SeedSet::new(programs.metadata)
        .with(PREFIX)
        .with(programs.metadata)
        .with(mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::test_support::{programs, Bytes};
    use crate::core::RawAccount;

    fn padded(s: &str, width: usize) -> String {
        let mut out = s.to_string();
        out.extend(std::iter::repeat('\0').take(width - s.len()));
        out
    }

    #[test]
    fn decodes_and_trims_padding() {
        let programs = programs();
        let mint = Pubkey::new_unique();
        let creator = Pubkey::new_unique();
        let data = Bytes::default()
            .u8(METADATA_KEY)
            .key(&Pubkey::new_unique())
            .key(&mint)
            .string(&padded("Whale #1", 32))
            .string(&padded("WHL", 10))
            .string(&padded("https://arweave.net/whale", 200))
            .u16(500)
            .u8(1)
            .u32(1)
            .key(&creator)
            .u8(1)
            .u8(100)
            .u8(1)
            .u8(1)
            .u8(1)
            .u8(254)
            .pad_to(679)
            .build();
        let raw = RawAccount::new(Pubkey::new_unique(), programs.metadata, data);

        let metadata = Metadata::from_raw(&raw, &programs).unwrap();
        assert_eq!(metadata.data.mint, mint);
        assert_eq!(metadata.data.data.name, "Whale #1");
        assert_eq!(metadata.data.data.symbol, "WHL");
        assert_eq!(metadata.data.data.uri, "https://arweave.net/whale");
        assert_eq!(metadata.data.data.seller_fee_basis_points, 500);
        let creators = metadata.data.data.creators.as_deref().unwrap();
        assert_eq!(creators.len(), 1);
        assert_eq!(creators[0].address, creator);
        assert!(creators[0].verified);
        assert_eq!(creators[0].share, 100);
        assert!(metadata.data.primary_sale_happened);
        assert_eq!(metadata.data.edition_nonce, Some(254));
    }

    #[test]
    fn serializes_with_base58_addresses() {
        let programs = programs();
        let mint = Pubkey::new_unique();
        let data = Bytes::default()
            .u8(METADATA_KEY)
            .key(&Pubkey::new_unique())
            .key(&mint)
            .string("A")
            .string("B")
            .string("C")
            .u16(0)
            .u8(0)
            .u8(0)
            .u8(0)
            .u8(0)
            .build();
        let raw = RawAccount::new(Pubkey::new_unique(), programs.metadata, data);
        let metadata = Metadata::from_raw(&raw, &programs).unwrap();

        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["data"]["mint"], mint.to_string());
        assert_eq!(json["data"]["data"]["name"], "A");
        assert!(json["data"]["data"]["creators"].is_null());
    }

    #[test]
    fn rejects_edition_tag() {
        let programs = programs();
        let raw = RawAccount::new(Pubkey::new_unique(), programs.metadata, vec![6u8; 100]);
        assert!(matches!(
            Metadata::from_raw(&raw, &programs),
            Err(AccountError::IncompatibleLayout { .. })
        ));
    }
}
