//! Asset and account queries against the indexer
//!
//! Listings come either from an account's current holdings or from its
//! asset-transfer history. The `_with_details` variants add asset names with
//! one paced lookup per asset.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::domain::result::{Error, ErrorCode, OperationResult, Result};
use crate::domain::{
    funding_hint, AssetInfo, AssetListing, AssetSummary, RetryPolicy, TESTNET_DISPENSER_URL,
};
use crate::ports::IndexerClient;

/// Pause between consecutive indexer lookups
pub const DEFAULT_PACING_MS: u64 = 200;

const UNKNOWN_ACCOUNT_MARKER: &str = "no accounts found for address";
const NO_ASSETS_MESSAGE: &str = "Account doesn't have any asset";
const ASSET_INFO_MISSING_MESSAGE: &str = "Required asset info error.";

/// Read-only asset queries
pub struct AssetQueryService {
    indexer: Arc<dyn IndexerClient>,
    retry: RetryPolicy,
    pacing: Duration,
}

impl AssetQueryService {
    pub fn new(indexer: Arc<dyn IndexerClient>) -> Self {
        Self {
            indexer,
            retry: RetryPolicy::default(),
            pacing: Duration::from_millis(DEFAULT_PACING_MS),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Delay inserted after each indexer lookup
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    fn pause(&self) {
        if !self.pacing.is_zero() {
            thread::sleep(self.pacing);
        }
    }

    /// List the assets an account currently holds
    pub fn fetch_asset_info(
        &self,
        address: &str,
        include_zero_assets: bool,
    ) -> OperationResult<AssetListing> {
        match self.holdings(address, include_zero_assets) {
            Ok((amount, assets)) => {
                let listing = AssetListing::new(Some(amount), assets);
                OperationResult::ok(listing.message.clone(), listing)
            }
            Err(failure) => failure,
        }
    }

    /// Like [`fetch_asset_info`](Self::fetch_asset_info), with asset names
    pub fn fetch_asset_info_with_details(
        &self,
        address: &str,
        include_zero_assets: bool,
    ) -> OperationResult<AssetListing> {
        let (amount, mut assets) = match self.holdings(address, include_zero_assets) {
            Ok(found) => found,
            Err(failure) => return failure,
        };

        if let Err(failure) = self.attach_names(&mut assets) {
            return failure.with_context("account_amount", amount.into());
        }

        let listing = AssetListing::new(Some(amount), assets);
        OperationResult::ok(listing.message.clone(), listing)
    }

    /// List the assets an account has sent or received, from its `axfer` history
    pub fn fetch_asset_transfers(&self, address: &str) -> OperationResult<AssetListing> {
        match self.transfer_summaries(address) {
            Ok(assets) => {
                let listing = AssetListing::new(None, assets);
                OperationResult::ok(listing.message.clone(), listing)
            }
            Err(e) => {
                tracing::error!("Transfer history lookup for {} failed: {}", address, e);
                OperationResult::from_error(&e)
            }
        }
    }

    /// Like [`fetch_asset_transfers`](Self::fetch_asset_transfers), with asset names
    pub fn fetch_asset_transfers_with_details(
        &self,
        address: &str,
    ) -> OperationResult<AssetListing> {
        let mut assets = match self.transfer_summaries(address) {
            Ok(assets) => assets,
            Err(e) => {
                tracing::error!("Transfer history lookup for {} failed: {}", address, e);
                return OperationResult::from_error(&e);
            }
        };

        if let Err(failure) = self.attach_names(&mut assets) {
            return failure;
        }

        let listing = AssetListing::new(None, assets);
        OperationResult::ok(listing.message.clone(), listing)
    }

    /// Look up one asset; errors are logged and yield `None`
    pub fn asset_info(&self, asset_id: u64) -> Option<AssetInfo> {
        match self.indexer.lookup_asset(asset_id) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::error!("Asset {} lookup failed: {}", asset_id, e);
                None
            }
        }
    }

    /// Account balance and filtered holdings, or the failure to report
    fn holdings(
        &self,
        address: &str,
        include_zero_assets: bool,
    ) -> std::result::Result<(u64, Vec<AssetSummary>), OperationResult<AssetListing>> {
        let account = match self.indexer.lookup_account(address) {
            Ok(account) => account,
            Err(e) => return Err(lookup_failure(address, &e)),
        };
        self.pause();

        if account.amount == 0 {
            tracing::warn!("Account {} holds no algos", address);
            return Err(OperationResult::fail(
                ErrorCode::NoFunds,
                funding_hint(address),
            ));
        }

        let Some(holdings) = account.assets else {
            return Err(
                OperationResult::fail(ErrorCode::NoAssets, NO_ASSETS_MESSAGE)
                    .with_context("account_amount", account.amount.into()),
            );
        };

        let assets = holdings
            .into_iter()
            .filter(|h| include_zero_assets || h.amount != 0)
            .map(|h| AssetSummary {
                asset_id: h.asset_id,
                asset_name: None,
                asset_amount: h.amount,
            })
            .collect();

        Ok((account.amount, assets))
    }

    fn transfer_summaries(&self, address: &str) -> Result<Vec<AssetSummary>> {
        let records = self.indexer.search_asset_transfers(address)?;
        Ok(records
            .into_iter()
            .map(|r| AssetSummary {
                asset_id: r.asset_transfer_transaction.asset_id,
                asset_name: None,
                asset_amount: r.asset_transfer_transaction.amount,
            })
            .collect())
    }

    /// Fill in `asset_name` for every summary, one lookup at a time
    fn attach_names(
        &self,
        assets: &mut [AssetSummary],
    ) -> std::result::Result<(), OperationResult<AssetListing>> {
        for summary in assets.iter_mut() {
            let asset_id = summary.asset_id;
            let lookup = self.retry.run(
                &format!("Asset {} lookup", asset_id),
                || self.indexer.lookup_asset(asset_id),
                Error::is_rate_limit,
            );

            let name = match lookup {
                Ok(info) => info.name().map(str::to_string),
                Err(e) => {
                    tracing::error!("Asset {} lookup failed: {}", asset_id, e);
                    None
                }
            };

            match name {
                Some(name) => {
                    summary.asset_name = Some(name);
                    self.pause();
                }
                None => {
                    return Err(OperationResult::fail(
                        ErrorCode::AssetInfoMissing,
                        ASSET_INFO_MISSING_MESSAGE,
                    )
                    .with_context("asset_id", asset_id.into()));
                }
            }
        }
        Ok(())
    }
}

fn lookup_failure(address: &str, error: &Error) -> OperationResult<AssetListing> {
    tracing::error!("Account lookup for {} failed: {}", address, error);
    let message = error.to_string();
    if message.contains(UNKNOWN_ACCOUNT_MARKER) {
        return OperationResult::fail(
            ErrorCode::NotFound,
            format!(
                "{} Add initial fund to the account via {}",
                message, TESTNET_DISPENSER_URL
            ),
        );
    }
    OperationResult::from_error(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AssetHolding, AssetTransferDetail, AssetTransferRecord, IndexerAccount,
        IndexerAssetParams,
    };
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubIndexer {
        account: Option<IndexerAccount>,
        account_error: Option<String>,
        names: HashMap<u64, Option<String>>,
        rate_limited_once: Mutex<Vec<u64>>,
        asset_calls: Mutex<Vec<u64>>,
        transfers: Vec<AssetTransferRecord>,
    }

    impl IndexerClient for StubIndexer {
        fn lookup_account(&self, address: &str) -> Result<IndexerAccount> {
            if let Some(msg) = &self.account_error {
                return Err(Error::not_found(msg.clone()));
            }
            self.account
                .clone()
                .ok_or_else(|| Error::not_found(format!("no accounts found for address {}", address)))
        }

        fn lookup_asset(&self, asset_id: u64) -> Result<AssetInfo> {
            self.asset_calls.lock().unwrap().push(asset_id);
            let mut limited = self.rate_limited_once.lock().unwrap();
            if let Some(pos) = limited.iter().position(|id| *id == asset_id) {
                limited.remove(pos);
                return Err(Error::RateLimited("slow down".into()));
            }
            match self.names.get(&asset_id) {
                Some(name) => Ok(AssetInfo {
                    index: asset_id,
                    params: IndexerAssetParams {
                        name: name.clone(),
                        ..Default::default()
                    },
                }),
                None => Err(Error::not_found(format!("asset {} not found", asset_id))),
            }
        }

        fn search_asset_transfers(&self, _address: &str) -> Result<Vec<AssetTransferRecord>> {
            Ok(self.transfers.clone())
        }
    }

    fn holding(asset_id: u64, amount: u64) -> AssetHolding {
        AssetHolding {
            asset_id,
            amount,
            is_frozen: false,
        }
    }

    fn account(amount: u64, assets: Option<Vec<AssetHolding>>) -> IndexerAccount {
        IndexerAccount {
            address: "ADDR".into(),
            amount,
            assets,
        }
    }

    fn service(stub: StubIndexer) -> (AssetQueryService, Arc<StubIndexer>) {
        let stub = Arc::new(stub);
        let service = AssetQueryService::new(stub.clone())
            .with_pacing(Duration::ZERO)
            .with_retry_policy(RetryPolicy {
                max_attempts: 2,
                backoff_ms: vec![0],
                settle_delay_ms: 0,
            });
        (service, stub)
    }

    #[test]
    fn test_zero_holdings_are_dropped() {
        let (service, _) = service(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(1, 0), holding(2, 5)]))),
            ..Default::default()
        });

        let result = service.fetch_asset_info("ADDR", false);
        assert!(result.success);
        let listing = result.data.unwrap();
        assert_eq!(listing.account_amount, Some(1_000));
        assert_eq!(listing.message, "1 asset found.");
        assert_eq!(listing.assets.len(), 1);
        assert_eq!(listing.assets[0].asset_id, 2);
        assert_eq!(listing.assets[0].asset_amount, 5);
    }

    #[test]
    fn test_zero_holdings_kept_on_request() {
        let (service, _) = service(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(1, 0), holding(2, 5)]))),
            ..Default::default()
        });

        let listing = service.fetch_asset_info("ADDR", true).data.unwrap();
        assert_eq!(listing.assets.len(), 2);
        assert_eq!(listing.message, "2 asset found.");
    }

    #[test]
    fn test_unfunded_account() {
        let (service, _) = service(StubIndexer {
            account: Some(account(0, Some(vec![holding(2, 5)]))),
            ..Default::default()
        });

        let result = service.fetch_asset_info("ADDR", false);
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::NoFunds));
        assert!(result.message.contains("No initial amount found on Account: ADDR"));
    }

    #[test]
    fn test_unknown_account_gets_funding_hint() {
        let (service, _) = service(StubIndexer::default());

        let result = service.fetch_asset_info("NEW", false);
        assert_eq!(result.error_code, Some(ErrorCode::NotFound));
        assert!(result.message.contains("no accounts found for address NEW"));
        assert!(result
            .message
            .ends_with("Add initial fund to the account via https://bank.testnet.algorand.network/"));
    }

    #[test]
    fn test_other_lookup_errors_pass_through() {
        let (service, _) = service(StubIndexer {
            account_error: Some("indexer offline".into()),
            ..Default::default()
        });

        let result = service.fetch_asset_info("ADDR", false);
        assert_eq!(result.error_code, Some(ErrorCode::NotFound));
        assert!(!result.message.contains("Add initial fund"));
    }

    #[test]
    fn test_account_without_assets() {
        let (service, _) = service(StubIndexer {
            account: Some(account(300_000, None)),
            ..Default::default()
        });

        let result = service.fetch_asset_info("ADDR", false);
        assert_eq!(result.error_code, Some(ErrorCode::NoAssets));
        assert_eq!(result.message, "Account doesn't have any asset");
    }

    #[test]
    fn test_details_adds_names_after_one_retry() {
        let (service, stub) = service(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(2, 5), holding(3, 1)]))),
            names: HashMap::from([(2, Some("Gold".to_string())), (3, Some("Silver".to_string()))]),
            rate_limited_once: Mutex::new(vec![3]),
            ..Default::default()
        });

        let listing = service
            .fetch_asset_info_with_details("ADDR", false)
            .data
            .unwrap();
        let names: Vec<_> = listing
            .assets
            .iter()
            .map(|a| a.asset_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["Gold", "Silver"]);
        assert_eq!(*stub.asset_calls.lock().unwrap(), vec![2, 3, 3]);
    }

    #[test]
    fn test_details_missing_name_fails() {
        let (service, _) = service(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(2, 5)]))),
            names: HashMap::from([(2, None)]),
            ..Default::default()
        });

        let result = service.fetch_asset_info_with_details("ADDR", false);
        assert_eq!(result.error_code, Some(ErrorCode::AssetInfoMissing));
        assert_eq!(result.message, "Required asset info error.");
    }

    #[test]
    fn test_details_does_not_retry_other_errors() {
        let (service, stub) = service(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(9, 5)]))),
            ..Default::default()
        });

        let result = service.fetch_asset_info_with_details("ADDR", false);
        assert_eq!(result.error_code, Some(ErrorCode::AssetInfoMissing));
        assert_eq!(*stub.asset_calls.lock().unwrap(), vec![9]);
    }

    #[test]
    fn test_failed_lookup_returns_without_pacing() {
        let stub = Arc::new(StubIndexer {
            account: Some(account(1_000, Some(vec![holding(9, 5)]))),
            ..Default::default()
        });
        let service = AssetQueryService::new(stub.clone())
            .with_pacing(Duration::from_secs(5))
            .with_retry_policy(RetryPolicy::none());

        let started = std::time::Instant::now();
        let result = service.fetch_asset_info_with_details("ADDR", false);
        assert_eq!(result.error_code, Some(ErrorCode::AssetInfoMissing));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_transfer_history_listing() {
        let record = |id: &str, asset_id: u64, amount: u64| AssetTransferRecord {
            id: id.into(),
            sender: "S".into(),
            confirmed_round: Some(4),
            asset_transfer_transaction: AssetTransferDetail {
                asset_id,
                amount,
                receiver: "R".into(),
            },
        };
        let (service, _) = service(StubIndexer {
            transfers: vec![record("A", 2, 0), record("B", 3, 7)],
            names: HashMap::from([(2, Some("Gold".to_string())), (3, Some("Silver".to_string()))]),
            ..Default::default()
        });

        let listing = service.fetch_asset_transfers("ADDR").data.unwrap();
        assert!(listing.account_amount.is_none());
        assert_eq!(listing.assets.len(), 2);

        let detailed = service
            .fetch_asset_transfers_with_details("ADDR")
            .data
            .unwrap();
        assert_eq!(detailed.assets[1].asset_name.as_deref(), Some("Silver"));
    }

    #[test]
    fn test_asset_info_swallows_errors() {
        let (service, _) = service(StubIndexer {
            names: HashMap::from([(2, Some("Gold".to_string()))]),
            ..Default::default()
        });

        assert_eq!(service.asset_info(2).unwrap().index, 2);
        assert!(service.asset_info(99).is_none());
    }
}
