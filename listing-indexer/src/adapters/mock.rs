//! In-memory account fetcher
//!
//! Serves a fixed set of accounts in insertion order, applying memcmp filters
//! the way a validator would. Individual addresses or programs can be made
//! to fail or stall.

use crate::core::{AccountFetcher, MemcmpFilter, NetworkError, RawAccount};
use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct MockAccountFetcher {
    accounts: Vec<RawAccount>,
    failing: HashMap<Pubkey, NetworkError>,
    delays: HashMap<Pubkey, Duration>,
}

impl MockAccountFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, account: RawAccount) -> Self {
        self.accounts.push(account);
        self
    }

    pub fn with_accounts(mut self, accounts: impl IntoIterator<Item = RawAccount>) -> Self {
        self.accounts.extend(accounts);
        self
    }

    /// Fail lookups of `key`, either as a single address or as a program id
    pub fn with_failure(mut self, key: Pubkey, error: NetworkError) -> Self {
        self.failing.insert(key, error);
        self
    }

    /// Sleep before answering lookups of `key`
    pub fn with_delay(mut self, key: Pubkey, delay: Duration) -> Self {
        self.delays.insert(key, delay);
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    async fn enter(&self, key: &Pubkey) -> Result<(), NetworkError> {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        match self.failing.get(key) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl AccountFetcher for MockAccountFetcher {
    async fn fetch_by_filters(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, NetworkError> {
        self.enter(program_id).await?;
        Ok(self
            .accounts
            .iter()
            .filter(|account| account.owner == *program_id)
            .filter(|account| filters.iter().all(|f| f.matches(&account.data)))
            .cloned()
            .collect())
    }

    async fn fetch_one(&self, address: &Pubkey) -> Result<Option<RawAccount>, NetworkError> {
        self.enter(address).await?;
        Ok(self
            .accounts
            .iter()
            .find(|account| account.address == *address)
            .cloned())
    }
}
