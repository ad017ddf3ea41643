//! Algod REST v2 client
//!
//! Talks to an algod node (or a hosted endpoint such as PureStake) with the
//! configured API token sent under both header names hosted providers accept.

use anyhow::Result;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::http::{build_client, map_request_error, normalize_base_url, parse_json};
use crate::domain::result::Result as DomainResult;
use crate::domain::{AccountInformation, Address, NodeStatus, PendingTransaction, SuggestedParams};
use crate::ports::LedgerClient;

const SERVICE: &str = "algod";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    tx_id: String,
}

/// Algod HTTP client
#[derive(Debug)]
pub struct AlgodClient {
    client: Client,
    token: String,
    base_url: String,
}

impl AlgodClient {
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            token: token.to_string(),
            base_url: normalize_base_url(base_url)?,
        })
    }

    fn get(&self, path: &str) -> reqwest::blocking::RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .header("X-Algo-API-Token", &self.token)
            .header("X-API-Key", &self.token)
    }

    fn fetch<T: serde::de::DeserializeOwned>(&self, path: &str) -> DomainResult<T> {
        let response = self
            .get(path)
            .send()
            .map_err(|e| map_request_error(SERVICE, e))?;
        parse_json(SERVICE, response)
    }
}

impl LedgerClient for AlgodClient {
    fn suggested_params(&self) -> DomainResult<SuggestedParams> {
        self.fetch("/v2/transactions/params")
    }

    fn account_information(&self, address: &Address) -> DomainResult<AccountInformation> {
        self.fetch(&format!("/v2/accounts/{}", address))
    }

    fn send_raw_transaction(&self, signed: &[u8]) -> DomainResult<String> {
        let response = self
            .client
            .post(format!("{}/v2/transactions", self.base_url))
            .header("X-Algo-API-Token", &self.token)
            .header("X-API-Key", &self.token)
            .header("Content-Type", "application/x-binary")
            .body(signed.to_vec())
            .send()
            .map_err(|e| map_request_error(SERVICE, e))?;
        let submitted: SubmitResponse = parse_json(SERVICE, response)?;
        Ok(submitted.tx_id)
    }

    fn status(&self) -> DomainResult<NodeStatus> {
        self.fetch("/v2/status")
    }

    fn status_after_block(&self, round: u64) -> DomainResult<NodeStatus> {
        self.fetch(&format!("/v2/status/wait-for-block-after/{}", round))
    }

    fn pending_transaction_info(&self, tx_id: &str) -> DomainResult<PendingTransaction> {
        let response = self
            .get(&format!("/v2/transactions/pending/{}", tx_id))
            .query(&[("format", "json")])
            .send()
            .map_err(|e| map_request_error(SERVICE, e))?;
        parse_json(SERVICE, response)
    }
}
