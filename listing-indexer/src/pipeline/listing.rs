//! Composite listing produced by the pipeline

use crate::accounts::{Auction, Metadata};
use serde::Serialize;

/// One active auction: the metadata of the first item on sale, its
/// effective price and the auction itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing {
    pub metadata: Metadata,
    pub price: u64,
    pub auction: Auction,
}
