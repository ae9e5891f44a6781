//! Lightweight Solana JSON-RPC account fetcher
//!
//! Only `getAccountInfo` and `getProgramAccounts` are needed, so this talks
//! JSON-RPC over ureq directly instead of pulling in solana-client.

use crate::core::{AccountFetcher, MemcmpFilter, NetworkError, RawAccount};
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Account fetcher backed by a Solana JSON-RPC endpoint
pub struct RpcAccountFetcher {
    url: String,
    commitment: String,
    agent: ureq::Agent,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<T> {
    result: Option<T>,
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct AccountInfo {
    data: (String, String), // (data, encoding)
    owner: String,
}

#[derive(Debug, Deserialize)]
struct KeyedAccount {
    pubkey: String,
    account: AccountInfo,
}

impl RpcAccountFetcher {
    pub fn new(url: impl Into<String>, commitment: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(timeout)
            .build();

        Self {
            url: url.into(),
            commitment: commitment.into(),
            agent,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call<T>(&self, method: &str, params: Value) -> Result<T, NetworkError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let request_body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("RPC call: {}", method);

        // ureq is blocking
        let response_body = tokio::task::spawn_blocking({
            let agent = self.agent.clone();
            let url = self.url.clone();
            let body = request_body.to_string();

            move || {
                let response = agent
                    .post(&url)
                    .set("Content-Type", "application/json")
                    .send_string(&body)?;
                let text = response.into_string()?;
                Ok::<String, ureq::Error>(text)
            }
        })
        .await
        .map_err(|e| NetworkError::Transport(e.to_string()))?
        .map_err(|e| NetworkError::Transport(e.to_string()))?;

        let rpc_response: RpcResponse<T> = serde_json::from_str(&response_body)
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        if let Some(error) = rpc_response.error {
            return Err(NetworkError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        rpc_response
            .result
            .ok_or_else(|| NetworkError::InvalidResponse(format!("no result for {method}")))
    }

    fn account_config(&self) -> Value {
        json!({
            "encoding": "base64",
            "commitment": self.commitment,
        })
    }
}

/// JSON form of a memcmp filter; the compared bytes travel base58 encoded.
fn filter_json(filter: &MemcmpFilter) -> Value {
    json!({
        "memcmp": {
            "offset": filter.offset,
            "bytes": bs58::encode(&filter.bytes).into_string(),
        }
    })
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey, NetworkError> {
    Pubkey::from_str(value)
        .map_err(|e| NetworkError::InvalidResponse(format!("bad {field} `{value}`: {e}")))
}

fn raw_account(address: Pubkey, info: AccountInfo) -> Result<RawAccount, NetworkError> {
    let (encoded, encoding) = info.data;
    if encoding != "base64" {
        return Err(NetworkError::InvalidResponse(format!(
            "unsupported data encoding: {encoding}"
        )));
    }
    let data = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| NetworkError::InvalidResponse(format!("failed to decode account data: {e}")))?;
    let owner = parse_pubkey("owner", &info.owner)?;
    Ok(RawAccount::new(address, owner, data))
}

#[async_trait]
impl AccountFetcher for RpcAccountFetcher {
    async fn fetch_by_filters(
        &self,
        program_id: &Pubkey,
        filters: &[MemcmpFilter],
    ) -> Result<Vec<RawAccount>, NetworkError> {
        let mut config = self.account_config();
        config["filters"] = Value::Array(filters.iter().map(filter_json).collect());
        let params = json!([program_id.to_string(), config]);

        let accounts: Vec<KeyedAccount> = self.call("getProgramAccounts", params).await?;
        debug!("getProgramAccounts {} returned {} accounts", program_id, accounts.len());

        accounts
            .into_iter()
            .map(|keyed| {
                let address = parse_pubkey("pubkey", &keyed.pubkey)?;
                raw_account(address, keyed.account)
            })
            .collect()
    }

    async fn fetch_one(&self, address: &Pubkey) -> Result<Option<RawAccount>, NetworkError> {
        let params = json!([address.to_string(), self.account_config()]);
        let response: Value = self.call("getAccountInfo", params).await?;

        let value = &response["value"];
        if value.is_null() {
            return Ok(None);
        }

        let info: AccountInfo = serde_json::from_value(value.clone())
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;
        raw_account(*address, info).map(Some)
    }
}
