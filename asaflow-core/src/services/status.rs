//! Status service - node and creator account summary

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::Result;
use crate::domain::{Address, MIN_FUNDED_BALANCE};
use crate::ports::LedgerClient;

/// Status service for node and account summaries
pub struct StatusService {
    ledger: Arc<dyn LedgerClient>,
}

impl StatusService {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Node round plus the balance of `account`, when given
    pub fn get_status(&self, account: Option<&Address>) -> Result<StatusSummary> {
        let node = self.ledger.status()?;
        let params = self.ledger.suggested_params()?;

        let account = match account {
            Some(address) => {
                let info = self.ledger.account_information(address)?;
                Some(AccountSummary {
                    address: address.to_string(),
                    amount: info.amount,
                    min_balance: info.min_balance,
                    asset_count: info.assets.len(),
                    funded: info.amount >= MIN_FUNDED_BALANCE,
                })
            }
            None => None,
        };

        Ok(StatusSummary {
            last_round: node.last_round,
            genesis_id: params.genesis_id,
            min_fee: params.min_fee,
            account,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub last_round: u64,
    pub genesis_id: String,
    pub min_fee: u64,
    pub account: Option<AccountSummary>,
}

#[derive(Debug, Serialize)]
pub struct AccountSummary {
    pub address: String,
    pub amount: u64,
    pub min_balance: u64,
    pub asset_count: usize,
    /// Balance at or above the transfer funding threshold
    pub funded: bool,
}
