//! Payout tickets (metaplex program)

use super::{expect_tag, pubkey, Account, AccountLayout, ProgramIds};
use crate::core::{pubkey_string, AccountError, DecodeError, MemcmpFilter};
use crate::schema::{FieldKind, Record, Schema};
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;
use std::sync::OnceLock;

pub const PAYOUT_TICKET_KEY: u8 = 5;
pub const RECIPIENT_OFFSET: usize = 1;

pub type PayoutTicket = Account<PayoutTicketData>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutTicketData {
    pub key: u8,
    #[serde(with = "pubkey_string")]
    pub recipient: Pubkey,
    pub amount_paid: u64,
}

impl AccountLayout for PayoutTicketData {
    const FAMILY: &'static str = "payout ticket";

    fn owner(programs: &ProgramIds) -> Pubkey {
        programs.metaplex
    }

    fn schema() -> &'static Schema {
        static SCHEMA: OnceLock<Schema> = OnceLock::new();
        SCHEMA.get_or_init(|| {
            Schema::new()
                .field("key", FieldKind::U8)
                .field("recipient", FieldKind::Address)
                .field("amountPaid", FieldKind::U64)
        })
    }

    fn check_layout(data: &[u8]) -> Result<(), AccountError> {
        expect_tag(Self::FAMILY, data, PAYOUT_TICKET_KEY)
    }

    fn from_record(record: &Record) -> Result<Self, DecodeError> {
        Ok(Self {
            key: record.u8("key")?,
            recipient: pubkey(record, "recipient")?,
            amount_paid: record.uint("amountPaid")?,
        })
    }
}

/// Filters selecting every ticket paid to `recipient`
pub fn recipient_filters(recipient: &Pubkey) -> Vec<MemcmpFilter> {
    vec![
        MemcmpFilter::tag(PAYOUT_TICKET_KEY),
        MemcmpFilter::address(RECIPIENT_OFFSET, recipient),
    ]
}
