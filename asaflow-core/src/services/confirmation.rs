//! Confirmation polling
//!
//! Waits for a submitted transaction by following the node one round at a
//! time. There is no timeout: a transaction that never confirms
//! keeps the caller blocked. Node errors propagate unchanged.

use std::sync::Arc;

use crate::domain::result::Result;
use crate::domain::{PendingTransaction, TransactionReceipt};
use crate::ports::LedgerClient;

/// Blocks until transactions are confirmed
pub struct ConfirmationPoller {
    ledger: Arc<dyn LedgerClient>,
}

impl ConfirmationPoller {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Wait until `tx_id` reports a confirmed round and return its pending record
    pub fn wait_for_confirmation(&self, tx_id: &str) -> Result<PendingTransaction> {
        let mut last_round = self.ledger.status()?.last_round;
        let mut info = self.ledger.pending_transaction_info(tx_id)?;

        while !info.is_confirmed() {
            if !info.pool_error.is_empty() {
                tracing::warn!("Transaction {} pool error: {}", tx_id, info.pool_error);
            }
            tracing::info!("Waiting for confirmation of {}", tx_id);
            last_round += 1;
            self.ledger.status_after_block(last_round)?;
            info = self.ledger.pending_transaction_info(tx_id)?;
        }

        tracing::info!(
            "Transaction {} confirmed in round {}",
            tx_id,
            info.confirmed_round.unwrap_or_default()
        );
        Ok(info)
    }

    /// Wait for confirmation and reduce the result to a receipt
    pub fn confirm(&self, tx_id: &str) -> Result<TransactionReceipt> {
        let info = self.wait_for_confirmation(tx_id)?;
        Ok(TransactionReceipt {
            tx_id: tx_id.to_string(),
            confirmed_round: info.confirmed_round.unwrap_or_default(),
        })
    }

    /// Block until the node's last round reaches `round`
    pub fn wait_for_round(&self, round: u64) -> Result<u64> {
        let mut last_round = self.ledger.status()?.last_round;
        while last_round < round {
            last_round += 1;
            self.ledger.status_after_block(last_round)?;
            tracing::debug!("Round {} reached", last_round);
        }
        Ok(last_round)
    }
}
