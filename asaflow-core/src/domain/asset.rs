//! Asset domain model
//!
//! Holdings and asset metadata as the indexer reports them, plus the
//! summaries the query service hands back to callers.

use serde::{Deserialize, Serialize};

use super::account::Address;

/// One asset holding of an account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetHolding {
    pub asset_id: u64,
    pub amount: u64,
    #[serde(default)]
    pub is_frozen: bool,
}

/// Parameters for creating a new asset
#[derive(Debug, Clone, Default)]
pub struct AssetParams {
    pub total: u64,
    pub decimals: u32,
    pub default_frozen: bool,
    pub unit_name: String,
    pub asset_name: String,
    pub url: String,
    pub manager: Option<Address>,
    pub reserve: Option<Address>,
    pub freeze: Option<Address>,
    pub clawback: Option<Address>,
}

/// Asset parameters as returned by the indexer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerAssetParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_name: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub decimals: u32,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Asset record from `GET /v2/assets/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetInfo {
    pub index: u64,
    #[serde(default)]
    pub params: IndexerAssetParams,
}

impl AssetInfo {
    pub fn name(&self) -> Option<&str> {
        self.params.name.as_deref()
    }
}

/// Account record from the indexer
///
/// `assets` is `None` when the account has never held any asset; the indexer
/// omits the field entirely in that case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexerAccount {
    pub address: String,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub assets: Option<Vec<AssetHolding>>,
}

/// One line of an asset listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub asset_id: u64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub asset_name: Option<String>,
    pub asset_amount: u64,
}

/// Result of an asset listing query
///
/// `account_amount` is absent for listings built from transfer history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetListing {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub account_amount: Option<u64>,
    pub message: String,
    pub assets: Vec<AssetSummary>,
}

impl AssetListing {
    pub fn new(account_amount: Option<u64>, assets: Vec<AssetSummary>) -> Self {
        Self {
            account_amount,
            message: format!("{} asset found.", assets.len()),
            assets,
        }
    }
}

/// Asset-transfer detail of an indexer transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetTransferDetail {
    pub asset_id: u64,
    #[serde(default)]
    pub amount: u64,
    #[serde(default)]
    pub receiver: String,
}

/// An `axfer` transaction from an account's history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetTransferRecord {
    pub id: String,
    #[serde(default)]
    pub sender: String,
    #[serde(default)]
    pub confirmed_round: Option<u64>,
    pub asset_transfer_transaction: AssetTransferDetail,
}
