//! Adapters layer - implementations of the core ports
//!
//! `solana` talks to a real cluster; `mock` serves canned accounts for tests
//! and dry runs.

pub mod mock;
pub mod solana;

pub use mock::MockAccountFetcher;
pub use solana::{RpcAccountFetcher, SolanaAddressDeriver};
