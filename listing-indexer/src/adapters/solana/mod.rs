//! Solana adapters: JSON-RPC account fetching and PDA derivation

pub mod derivation;
pub mod rpc;

pub use derivation::SolanaAddressDeriver;
pub use rpc::RpcAccountFetcher;
