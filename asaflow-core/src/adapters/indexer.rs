//! Indexer REST v2 client

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{build_client, map_request_error, normalize_base_url, parse_json};
use crate::domain::result::Result as DomainResult;
use crate::domain::{AssetInfo, AssetTransferRecord, IndexerAccount};
use crate::ports::IndexerClient;

const SERVICE: &str = "indexer";

/// Upper bound on followed `next-token` pages when reading transfer history
const MAX_HISTORY_PAGES: usize = 20;

#[derive(Debug, Deserialize)]
struct AccountResponse {
    account: IndexerAccount,
}

#[derive(Debug, Deserialize)]
struct AssetResponse {
    asset: AssetInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TransactionsResponse {
    #[serde(default)]
    transactions: Vec<AssetTransferRecord>,
    #[serde(default)]
    next_token: Option<String>,
}

/// Indexer HTTP client
#[derive(Debug)]
pub struct IndexerHttpClient {
    client: Client,
    token: String,
    base_url: String,
    max_history_pages: usize,
}

impl IndexerHttpClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            token: token.to_string(),
            base_url: normalize_base_url(base_url)?,
            max_history_pages: MAX_HISTORY_PAGES,
        })
    }

    fn fetch<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> DomainResult<T> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Indexer-API-Token", &self.token)
            .header("X-API-Key", &self.token)
            .query(query)
            .send()
            .map_err(|e| map_request_error(SERVICE, e))?;
        parse_json(SERVICE, response)
    }
}

impl IndexerClient for IndexerHttpClient {
    fn lookup_account(&self, address: &str) -> DomainResult<IndexerAccount> {
        let response: AccountResponse = self.fetch(
            &format!("/v2/accounts/{}", address),
            &[("include-all", "true")],
        )?;
        Ok(response.account)
    }

    fn lookup_asset(&self, asset_id: u64) -> DomainResult<AssetInfo> {
        let response: AssetResponse = self.fetch(&format!("/v2/assets/{}", asset_id), &[])?;
        Ok(response.asset)
    }

    fn search_asset_transfers(&self, address: &str) -> DomainResult<Vec<AssetTransferRecord>> {
        let path = format!("/v2/accounts/{}/transactions", address);
        let mut records = Vec::new();
        let mut next: Option<String> = None;

        for _ in 0..self.max_history_pages {
            let mut query = vec![("tx-type", "axfer")];
            if let Some(token) = next.as_deref() {
                query.push(("next", token));
            }
            let page: TransactionsResponse = self.fetch(&path, &query)?;
            let empty = page.transactions.is_empty();
            records.extend(page.transactions);

            match page.next_token {
                Some(token) if !empty => next = Some(token),
                _ => return Ok(records),
            }
        }

        tracing::warn!(
            "Transfer history of {} cut at {} pages ({} records); older transfers are not listed",
            address,
            self.max_history_pages,
            records.len()
        );
        Ok(records)
    }
}
