//! Configuration for the listing indexer
//!
//! Loaded from TOML, then overridden by the `RPC`, `STORE_OWNER` and `PORT`
//! environment variables (a `.env` file is honoured), then validated. The
//! result is immutable for the life of the process.

use crate::accounts::ProgramIds;
use crate::snapshot::ChangeDetection;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct IndexerConfig {
    #[validate]
    pub rpc: RpcConfig,
    #[validate]
    pub programs: ProgramsConfig,
    #[validate]
    pub store: StoreConfig,
    #[validate]
    pub polling: PollingConfig,
    pub snapshot: SnapshotConfig,
    #[validate]
    pub api: ApiConfig,
    #[validate]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct RpcConfig {
    #[validate(url)]
    pub endpoint: String,
    pub commitment: String,
    #[validate(range(min = 1, max = 120))]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ProgramsConfig {
    #[validate(custom = "validate_pubkey")]
    pub metaplex: String,
    #[validate(custom = "validate_pubkey")]
    pub auction: String,
    #[validate(custom = "validate_pubkey")]
    pub vault: String,
    #[validate(custom = "validate_pubkey")]
    pub metadata: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct StoreConfig {
    /// Wallet that owns the store; no default
    #[validate(custom = "validate_pubkey")]
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PollingConfig {
    #[validate(range(min = 10, max = 3600))]
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    pub history_dir: PathBuf,
    pub history_prefix: String,
    pub change_detection: ChangeDetection,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_tls"))]
pub struct ApiConfig {
    pub bind_address: String,
    #[validate(range(min = 1))]
    pub port: u16,
    pub enable_cors: bool,
    pub tls_cert_path: Option<PathBuf>,
    pub tls_key_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct MonitoringConfig {
    pub log_level: String,
    pub structured_logging: bool,
    pub log_dir: Option<PathBuf>,
    /// Size at which the log file is rolled over
    #[validate(range(min = 1024))]
    pub log_max_bytes: u64,
    /// Log files kept, the live one included
    #[validate(range(min = 1, max = 100))]
    pub log_max_files: usize,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for ProgramsConfig {
    fn default() -> Self {
        Self {
            metaplex: "yp1ZrQ2ghLMDNdaGdYLiwi8QRFyws2tAHNa7JG2VuTq".to_string(),
            auction: "yauNkf2KVyLp9YBQb4mNeiwFCCWu1Vei9Tx3EsgCESG".to_string(),
            vault: "yvaUJxtAiuphyL7JiVMMdY7uTJe1ekb4LmHXtBv5SFd".to_string(),
            metadata: "ymejMoHH1bsxXCjKjjsVoCZGkq6bpmcxgTHYfLKRoHq".to_string(),
        }
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_secs: 300 }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: "./ywhales.json".into(),
            history_dir: "./ywhales_history".into(),
            history_prefix: "ywhales_".to_string(),
            change_detection: ChangeDetection::default(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 3000,
            enable_cors: true,
            tls_cert_path: None,
            tls_key_path: None,
        }
    }
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            structured_logging: false,
            log_dir: None,
            log_max_bytes: 5_120_000,
            log_max_files: 5,
        }
    }
}

fn validate_pubkey(value: &str) -> Result<(), ValidationError> {
    Pubkey::from_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_pubkey"))
}

fn validate_tls(api: &ApiConfig) -> Result<(), ValidationError> {
    match (&api.tls_cert_path, &api.tls_key_path) {
        (None, None) => Ok(()),
        (Some(cert), Some(key)) if cert.exists() && key.exists() => Ok(()),
        (Some(_), Some(_)) => Err(ValidationError::new("tls_file_missing")),
        _ => Err(ValidationError::new("tls_cert_and_key_required")),
    }
}

impl ApiConfig {
    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    pub fn tls_enabled(&self) -> bool {
        self.tls_cert_path.is_some()
    }
}

impl IndexerConfig {
    /// Load configuration from file, apply environment overrides and validate
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        config.check()?;
        Ok(config)
    }

    /// Defaults plus environment overrides, for running without a config file
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        config.check()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    pub(crate) fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(rpc) = lookup("RPC") {
            self.rpc.endpoint = rpc;
        }
        if let Some(owner) = lookup("STORE_OWNER") {
            self.store.owner = owner;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.api.port = port;
        }
    }

    /// Validate every section
    pub fn check(&self) -> Result<()> {
        Validate::validate(self).map_err(|e| anyhow!("invalid configuration: {e}"))
    }

    pub fn program_ids(&self) -> Result<ProgramIds> {
        Ok(ProgramIds {
            metaplex: parse_pubkey("programs.metaplex", &self.programs.metaplex)?,
            auction: parse_pubkey("programs.auction", &self.programs.auction)?,
            vault: parse_pubkey("programs.vault", &self.programs.vault)?,
            metadata: parse_pubkey("programs.metadata", &self.programs.metadata)?,
        })
    }

    pub fn store_owner(&self) -> Result<Pubkey> {
        parse_pubkey("store.owner", &self.store.owner)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.polling.interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc.request_timeout_secs)
    }
}

fn parse_pubkey(field: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|e| anyhow!("{field}: invalid address `{value}`: {e}"))
}
