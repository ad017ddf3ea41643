//! Ledger port - algod node abstraction

use crate::domain::result::Result;
use crate::domain::{AccountInformation, Address, NodeStatus, PendingTransaction, SuggestedParams};

/// Algod node client
///
/// Every call is a single blocking round trip. Implementations hold no
/// per-call state, so one client may be shared by every service.
pub trait LedgerClient: Send + Sync {
    /// Current suggested transaction parameters
    fn suggested_params(&self) -> Result<SuggestedParams>;

    /// Balance and holdings of an account
    fn account_information(&self, address: &Address) -> Result<AccountInformation>;

    /// Submit a signed, msgpack-encoded transaction and return its id
    fn send_raw_transaction(&self, signed: &[u8]) -> Result<String>;

    /// Node status
    fn status(&self) -> Result<NodeStatus>;

    /// Block until the node has seen a round after `round`
    fn status_after_block(&self, round: u64) -> Result<NodeStatus>;

    /// Pool or confirmation state of a submitted transaction
    fn pending_transaction_info(&self, tx_id: &str) -> Result<PendingTransaction>;
}
