//! Safety deposit configs (metaplex program)
//!
//! Per-box settings an auction manager applies when the auction settles:
//! which winners receive the item and how participation prints are sold.

use super::{auction_manager, expect_tag, invalid, opt_uint, optional, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, SeedSet};
use crate::schema::{FieldKind, Record, Schema, Value};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const SAFETY_DEPOSIT_CONFIG_KEY: u8 = 9;

pub type SafetyDepositConfig = Account<SafetyDepositConfigData>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WinningConfigType {
    TokenOnlyTransfer,
    FullRightsTransfer,
    PrintingV1,
    PrintingV2,
    Participation,
}

impl TryFrom<u8> for WinningConfigType {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::TokenOnlyTransfer,
            1 => Self::FullRightsTransfer,
            2 => Self::PrintingV1,
            3 => Self::PrintingV2,
            4 => Self::Participation,
            other => {
                return Err(invalid(
                    "winningConfigType",
                    format!("unknown winning config type {other}"),
                ))
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmountRange {
    pub amount: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationConfig {
    pub winner_constraint: u8,
    pub non_winning_constraint: u8,
    pub fixed_price: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyDepositConfigData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub auction_manager: Pubkey,
    pub order: u64,
    pub winning_config_type: WinningConfigType,
    pub amount_type: u8,
    pub length_type: u8,
    pub amount_ranges: Vec<AmountRange>,
    pub participation_config: Option<ParticipationConfig>,
    pub collected_to_accept_payment: Option<u64>,
}

impl AccountLayout for SafetyDepositConfigData {
    const FAMILY: &'static str = "safety deposit config";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metaplex
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            let range = Schema::new()
                .field("amount", FieldKind::U64)
                .field("length", FieldKind::U64);
            let participation = Schema::new()
                .field("winnerConstraint", FieldKind::U8)
                .field("nonWinningConstraint", FieldKind::U8)
                .field("fixedPrice", FieldKind::option(FieldKind::U64));
            let participation_state =
                Schema::new().field("collectedToAcceptPayment", FieldKind::U64);
            Schema::new()
                .field("key", FieldKind::U8)
                .field("auctionManager", FieldKind::Address)
                .field("order", FieldKind::U64)
                .field("winningConfigType", FieldKind::U8)
                .field("amountType", FieldKind::U8)
                .field("lengthType", FieldKind::U8)
                .field("amountRanges", FieldKind::vec(FieldKind::Struct(range)))
                .field(
                    "participationConfig",
                    FieldKind::option(FieldKind::Struct(participation)),
                )
                .field(
                    "participationState",
                    FieldKind::option(FieldKind::Struct(participation_state)),
                )
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, SAFETY_DEPOSIT_CONFIG_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        let amount_ranges = record
            .array("amountRanges")?
            .iter()
            .map(|item| {
                let range = item
                    .as_record()
                    .ok_or_else(|| invalid("amountRanges", "expected record"))?;
                Ok(AmountRange {
                    amount: range.uint("amount")?,
                    length: range.uint("length")?,
                })
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        let participation_config = optional(record, "participationConfig", "record", Value::as_record)?
            .map(|config| -> Result<_, DecodeError> {
                Ok(ParticipationConfig {
                    winner_constraint: config.u8("winnerConstraint")?,
                    non_winning_constraint: config.u8("nonWinningConstraint")?,
                    fixed_price: opt_uint(config, "fixedPrice")?,
                })
            })
            .transpose()?;

        let collected_to_accept_payment =
            optional(record, "participationState", "record", Value::as_record)?
                .map(|state| state.uint("collectedToAcceptPayment"))
                .transpose()?;

        Ok(Self {
            key: record.u8("key")?,
            auction_manager: pubkey(record, "auctionManager")?,
            order: record.uint("order")?,
            winning_config_type: WinningConfigType::try_from(record.u8("winningConfigType")?)?,
            amount_type: record.u8("amountType")?,
            length_type: record.u8("lengthType")?,
            amount_ranges,
            participation_config,
            collected_to_accept_payment,
        })
    }
}

pub fn seeds(programs: &ProgramIds, manager: &Pubkey, safety_deposit: &Pubkey) -> SeedSet {
    SeedSet::new(programs.metaplex)
        .with(auction_manager::PREFIX)
        .with(programs.metaplex)
        .with(manager)
        .with(safety_deposit)
}
