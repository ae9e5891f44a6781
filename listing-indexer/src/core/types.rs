//! Core domain types shared across layers

use solana_sdk::pubkey::Pubkey;
use std::fmt;

/// An account as returned by the fetcher: address, owning program and raw bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RawAccount {
    pub address: Pubkey,
    pub owner: Pubkey,
    pub data: Vec<u8>,
}

impl RawAccount {
    pub fn new(address: Pubkey, owner: Pubkey, data: Vec<u8>) -> Self {
        Self { address, owner, data }
    }
}

impl fmt::Debug for RawAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawAccount")
            .field("address", &self.address)
            .field("owner", &self.owner)
            .field("data_len", &self.data.len())
            .finish()
    }
}

/// Byte-offset equality filter, the `memcmp` filter of `getProgramAccounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: usize,
    pub bytes: Vec<u8>,
}

impl MemcmpFilter {
    pub fn new(offset: usize, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            bytes: bytes.into(),
        }
    }

    /// Filter on a single tag byte at offset 0
    pub fn tag(tag: u8) -> Self {
        Self::new(0, vec![tag])
    }

    pub fn address(offset: usize, address: &Pubkey) -> Self {
        Self::new(offset, address.to_bytes().to_vec())
    }

    pub fn matches(&self, data: &[u8]) -> bool {
        data.get(self.offset..self.offset + self.bytes.len())
            .is_some_and(|window| window == self.bytes.as_slice())
    }
}

/// A program id plus the ordered seeds of a program-derived address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSet {
    pub program_id: Pubkey,
    pub seeds: Vec<Vec<u8>>,
}

impl SeedSet {
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            seeds: Vec::new(),
        }
    }

    pub fn with(mut self, seed: impl AsRef<[u8]>) -> Self {
        self.seeds.push(seed.as_ref().to_vec());
        self
    }
}

/// Serde helper rendering a `Pubkey` as its base-58 string.
pub mod pubkey_string {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(D::Error::custom)
    }
}
