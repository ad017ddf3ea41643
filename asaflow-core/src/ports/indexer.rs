//! Indexer port

use crate::domain::result::Result;
use crate::domain::{AssetInfo, AssetTransferRecord, IndexerAccount};

/// Indexer client
pub trait IndexerClient: Send + Sync {
    /// Account record including every holding (`include-all=true`)
    ///
    /// An unknown address is reported as `Error::NotFound` carrying the
    /// indexer's message.
    fn lookup_account(&self, address: &str) -> Result<IndexerAccount>;

    /// Asset metadata
    fn lookup_asset(&self, asset_id: u64) -> Result<AssetInfo>;

    /// Asset-transfer (`axfer`) history of an address
    fn search_asset_transfers(&self, address: &str) -> Result<Vec<AssetTransferRecord>>;
}
