//! Configuration management
//!
//! Settings live in `<asaflow_dir>/settings.json`:
//! ```json
//! {
//!   "algod": { "server": "https://...", "explorerUrl": "https://..." },
//!   "indexer": { "server": "https://..." },
//!   "oreId": { "baseUrl": "https://service.oreid.io", "chainNetwork": "algo_test" },
//!   "assetId": 96230975,
//!   "transfer": { "autoFund": true, "fundAmount": 200000, "optInPolicy": "skip" },
//!   "retry": { "maxAttempts": 2, "backoffMs": [500], "settleDelayMs": 500 },
//!   "pacingMs": 200
//! }
//! ```
//!
//! Environment variables override the file. Secrets (tokens, keys, passwords)
//! are read from the environment only and are never written back.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::adapters::ORE_ID_DEFAULT_URL;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, Address, OreIdCredentials, PrivateKey, RetryPolicy, DEFAULT_ASSET_ID,
    DEFAULT_FUND_AMOUNT,
};
use crate::services::assets::DEFAULT_PACING_MS;
use crate::services::custodial::DEFAULT_CHAIN_NETWORK;
use crate::services::transfer::OptInPolicy;

pub const DEFAULT_ALGOD_URL: &str = "https://testnet-algorand.api.purestake.io/ps2";
pub const DEFAULT_INDEXER_URL: &str = "https://testnet-algorand.api.purestake.io/idx2";

/// Directory override for settings and the activity log
pub const DIR_ENV: &str = "ASAFLOW_DIR";

/// Resolve the asaflow directory: `$ASAFLOW_DIR`, else `~/.asaflow`
pub fn asaflow_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DIR_ENV) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::home_dir()
        .map(|home| home.join(".asaflow"))
        .ok_or_else(|| Error::Config("Could not determine home directory".into()))
}

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    algod: EndpointSettings,
    #[serde(default)]
    indexer: EndpointSettings,
    #[serde(default)]
    ore_id: OreIdSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    asset_id: Option<u64>,
    #[serde(default)]
    transfer: TransferSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    retry: Option<RetryPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pacing_ms: Option<u64>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EndpointSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    explorer_url: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OreIdSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    chain_network: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Transfer defaults as stored in settings.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferSettings {
    #[serde(default = "default_true")]
    pub auto_fund: bool,
    #[serde(default = "default_fund_amount")]
    pub fund_amount: u64,
    #[serde(default)]
    pub opt_in_policy: OptInPolicy,
}

fn default_true() -> bool {
    true
}

fn default_fund_amount() -> u64 {
    DEFAULT_FUND_AMOUNT
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            auto_fund: true,
            fund_amount: DEFAULT_FUND_AMOUNT,
            opt_in_policy: OptInPolicy::Skip,
        }
    }
}

/// ORE ID connection values
#[derive(Clone, Default)]
pub struct OreIdConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub service_key: Option<String>,
    pub account: Option<String>,
    pub password: Option<String>,
    /// Chain address of the custodial account
    pub chain_account: Option<String>,
    pub chain_network: String,
}

impl OreIdConfig {
    /// Login for the custodial account, when both halves are configured
    pub fn credentials(&self) -> Option<OreIdCredentials> {
        match (&self.account, &self.password) {
            (Some(account), Some(password)) => Some(OreIdCredentials {
                account: account.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

impl std::fmt::Debug for OreIdConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OreIdConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("service_key", &self.service_key.as_ref().map(|_| "<redacted>"))
            .field("account", &self.account)
            .field("chain_account", &self.chain_account)
            .field("chain_network", &self.chain_network)
            .finish()
    }
}

/// asaflow configuration
#[derive(Clone)]
pub struct Config {
    pub algod_url: String,
    pub indexer_url: String,
    /// API token sent to both algod and the indexer
    pub algo_token: String,
    pub explorer_url: Option<String>,
    /// Base64 private key of the creator (faucet) account
    pub creator_private_key: Option<String>,
    pub creator_address: Option<String>,
    pub ore_id: OreIdConfig,
    pub asset_id: u64,
    pub transfer: TransferSettings,
    pub retry: RetryPolicy,
    pub pacing_ms: u64,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_settings(SettingsFile::default())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("algod_url", &self.algod_url)
            .field("indexer_url", &self.indexer_url)
            .field("explorer_url", &self.explorer_url)
            .field("creator_address", &self.creator_address)
            .field("ore_id", &self.ore_id)
            .field("asset_id", &self.asset_id)
            .field("transfer", &self.transfer)
            .field("retry", &self.retry)
            .field("pacing_ms", &self.pacing_ms)
            .finish_non_exhaustive()
    }
}

/// Misspelled address key still found in older `.env` files
const LEGACY_ADDRESS_KEY: &str = "ALGO_FAUCET_ACCOUT_ADDRESS";

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    fn from_settings(raw: SettingsFile) -> Self {
        Self {
            algod_url: raw
                .algod
                .server
                .clone()
                .unwrap_or_else(|| DEFAULT_ALGOD_URL.to_string()),
            indexer_url: raw
                .indexer
                .server
                .clone()
                .unwrap_or_else(|| DEFAULT_INDEXER_URL.to_string()),
            algo_token: String::new(),
            explorer_url: raw.algod.explorer_url.clone(),
            creator_private_key: None,
            creator_address: None,
            ore_id: OreIdConfig {
                base_url: raw
                    .ore_id
                    .base_url
                    .clone()
                    .unwrap_or_else(|| ORE_ID_DEFAULT_URL.to_string()),
                chain_network: raw
                    .ore_id
                    .chain_network
                    .clone()
                    .unwrap_or_else(|| DEFAULT_CHAIN_NETWORK.to_string()),
                ..Default::default()
            },
            asset_id: raw.asset_id.unwrap_or(DEFAULT_ASSET_ID),
            transfer: raw.transfer.clone(),
            retry: raw.retry.clone().unwrap_or_default(),
            pacing_ms: raw.pacing_ms.unwrap_or(DEFAULT_PACING_MS),
            _raw_settings: raw,
        }
    }

    /// Load config from the asaflow directory, then apply environment overrides
    pub fn load(asaflow_dir: &Path) -> Result<Self> {
        let mut config = Self::load_file(asaflow_dir)?;
        config.apply_env()?;
        Ok(config)
    }

    /// Load settings.json only; a missing file yields defaults
    pub fn load_file(asaflow_dir: &Path) -> Result<Self> {
        let settings_path = asaflow_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).map_err(|e| {
                Error::Config(format!("Invalid {}: {}", settings_path.display(), e))
            })?
        } else {
            SettingsFile::default()
        };

        Ok(Self::from_settings(raw))
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_vars(env_value)
    }

    /// Overlay values looked up by environment key
    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = var("ALGO_SERVER") {
            self.algod_url = v;
        }
        if let Some(v) = var("ALGO_INDEXER_SERVER") {
            self.indexer_url = v;
        }
        if let Some(v) = var("ALGO_TOKEN") {
            self.algo_token = v;
        }
        if let Some(v) = var("ALGO_FAUCET_PRIVATE_KEY") {
            self.creator_private_key = Some(v);
        }
        if let Some(v) = var("ALGO_FAUCET_ACCOUNT_ADDRESS").or_else(|| var(LEGACY_ADDRESS_KEY)) {
            self.creator_address = Some(v);
        }
        if let Some(v) = var("ORE_ID_BASE_URL") {
            self.ore_id.base_url = v;
        }
        self.ore_id.api_key = var("ORE_ID_API_KEY").or(self.ore_id.api_key.take());
        self.ore_id.service_key =
            var("ORE_ID_SERVICE_KEY").or(self.ore_id.service_key.take());
        self.ore_id.account = var("ORE_ID_ACCOUNT").or(self.ore_id.account.take());
        self.ore_id.password =
            var("ORE_ID_ACCOUNT_PASSWORD").or(self.ore_id.password.take());
        self.ore_id.chain_account =
            var("ORE_ID_CHAIN_ACCOUNT").or(self.ore_id.chain_account.take());
        if let Some(v) = var("ASSET_ID") {
            self.asset_id = v
                .parse()
                .map_err(|_| Error::Config(format!("ASSET_ID is not a number: {}", v)))?;
        }
        Ok(())
    }

    /// Check endpoint URLs and the consistency of the creator account
    pub fn validate(&self) -> Result<()> {
        check_url("algod server", &self.algod_url)?;
        check_url("indexer server", &self.indexer_url)?;
        check_url("ORE ID base URL", &self.ore_id.base_url)?;
        if let Some(explorer) = &self.explorer_url {
            check_url("explorer URL", explorer)?;
        }
        if self.retry.max_attempts == 0 {
            return Err(Error::Config("retry.maxAttempts must be at least 1".into()));
        }
        if self.creator_private_key.is_some() {
            self.creator_account()?;
        }
        Ok(())
    }

    /// The creator (faucet) account with its signing key
    ///
    /// When both a key and an address are configured they must agree.
    pub fn creator_account(&self) -> Result<Account> {
        let encoded = self.creator_private_key.as_deref().ok_or_else(|| {
            Error::Config("ALGO_FAUCET_PRIVATE_KEY is not set".into())
        })?;
        let key = PrivateKey::from_base64(encoded)
            .map_err(|e| Error::Config(format!("ALGO_FAUCET_PRIVATE_KEY: {}", e)))?;

        if let Some(address) = &self.creator_address {
            let configured: Address = address
                .parse()
                .map_err(|e| Error::Config(format!("ALGO_FAUCET_ACCOUNT_ADDRESS: {}", e)))?;
            if configured != key.address() {
                return Err(Error::Config(format!(
                    "ALGO_FAUCET_ACCOUNT_ADDRESS {} does not match the private key ({})",
                    configured,
                    key.address()
                )));
            }
        }

        Ok(Account::from_private_key(key))
    }

    /// Creator address without requiring the key
    pub fn creator_address(&self) -> Result<Address> {
        if let Some(address) = &self.creator_address {
            return address
                .parse()
                .map_err(|e| Error::Config(format!("ALGO_FAUCET_ACCOUNT_ADDRESS: {}", e)));
        }
        Ok(self.creator_account()?.address)
    }

    /// Save config to the asaflow directory
    ///
    /// Preserves settings this crate does not manage. Values that came from
    /// the environment are not written.
    pub fn save(&self, asaflow_dir: &Path) -> Result<()> {
        std::fs::create_dir_all(asaflow_dir)?;
        let settings_path = asaflow_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            self._raw_settings.clone()
        };

        settings.asset_id = Some(self.asset_id);
        settings.transfer = self.transfer.clone();
        settings.retry = Some(self.retry.clone());
        settings.pacing_ms = Some(self.pacing_ms);
        settings.algod.explorer_url = self.explorer_url.clone();
        settings.ore_id.chain_network = Some(self.ore_id.chain_network.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

fn check_url(label: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::Config(format!("Invalid {} '{}': {}", label, value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "Invalid {} '{}': unsupported scheme {}",
            label, value, other
        ))),
    }
}
