//! Centralized error types for the listing indexer

use solana_sdk::pubkey::Pubkey;
use std::time::Duration;
use thiserror::Error;

/// Main indexer error type
#[derive(Error, Debug)]
pub enum IndexerError {
    #[error("Account error: {0}")]
    Account(#[from] AccountError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Derivation error: {0}")]
    Derivation(#[from] DerivationError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Cycle task failed: {0}")]
    Task(String),
}

/// Failures of the binary schema decoder. Always local to one buffer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Truncated buffer: needed {needed} bytes, {available} available")]
    TruncatedBuffer { needed: usize, available: usize },

    #[error("Invalid encoding in field `{field}`")]
    InvalidEncoding { field: String },

    #[error("Invalid value in field `{field}`: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Field `{field}` missing or not a {expected}")]
    FieldMismatch { field: String, expected: &'static str },
}

/// Account-model errors. The pipeline skips the offending account on any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("{family} owned by {actual}, expected {expected}")]
    WrongOwner {
        family: &'static str,
        expected: Pubkey,
        actual: Pubkey,
    },

    #[error("Incompatible {family} layout: {reason}")]
    IncompatibleLayout { family: &'static str, reason: String },

    #[error("Deprecated {family} layout")]
    DeprecatedLayout { family: &'static str },

    #[error("Failed to decode {family}: {source}")]
    Decode {
        family: &'static str,
        #[source]
        source: DecodeError,
    },
}

impl AccountError {
    /// Deprecated layouts are expected on chain and only worth a debug line.
    pub fn is_deprecated(&self) -> bool {
        matches!(self, AccountError::DeprecatedLayout { .. })
    }
}

/// Network-specific errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Invalid RPC response: {0}")]
    InvalidResponse(String),
}

/// Address derivation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DerivationError {
    #[error("No valid program address for {seed_count} seeds under {program_id}")]
    DerivationFailed { program_id: Pubkey, seed_count: usize },
}

/// Snapshot store errors
#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("Snapshot unreadable: {0}")]
    Unreadable(String),

    #[error("Snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for indexer operations
pub type IndexerResult<T> = Result<T, IndexerError>;
