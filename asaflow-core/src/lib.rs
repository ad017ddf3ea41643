//! asaflow Core - Algorand Standard Asset transfers
//!
//! This crate implements the core logic following hexagonal architecture:
//!
//! - **domain**: Addresses, keys, transactions and asset records
//! - **ports**: Trait definitions for external services (algod, indexer, ORE ID)
//! - **services**: Orchestration of transfers, custodial signing and queries
//! - **adapters**: HTTP implementations of the ports

pub mod adapters;
pub mod config;
pub mod domain;
mod log_migrations;
pub mod ports;
pub mod services;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use adapters::{AlgodClient, IndexerHttpClient, OreIdClient};
use config::Config;
use ports::{CustodialApi, IndexerClient, LedgerClient};
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, ErrorCode, OperationResult};
pub use domain::{Account, Address, AssetTransferIntent, PrivateKey, TransactionReceipt};

/// Main context for asaflow operations
///
/// Built once per process from a [`Config`]; every service receives its
/// clients from here.
pub struct AsaflowContext {
    pub config: Config,
    pub asaflow_dir: PathBuf,
    pub logger: Option<Arc<LoggingService>>,
    pub transfer_service: TransferService,
    pub asset_service: AssetQueryService,
    pub status_service: StatusService,
    /// Present when an ORE ID API key is configured
    pub custodial_service: Option<CustodialService>,
}

impl AsaflowContext {
    /// Load configuration from `asaflow_dir` and connect the HTTP clients
    pub fn new(asaflow_dir: &Path, entry_point: EntryPoint) -> Result<Self> {
        let config = Config::load(asaflow_dir)?;
        config.validate()?;

        let logger = match LoggingService::new(asaflow_dir, entry_point, env!("CARGO_PKG_VERSION"))
        {
            Ok(logger) => Some(Arc::new(logger)),
            Err(e) => {
                tracing::warn!("Activity log unavailable: {}", e);
                None
            }
        };

        let ledger: Arc<dyn LedgerClient> =
            Arc::new(AlgodClient::new(&config.algod_url, &config.algo_token)?);
        let indexer: Arc<dyn IndexerClient> =
            Arc::new(IndexerHttpClient::new(&config.indexer_url, &config.algo_token)?);
        let custodial: Option<Arc<dyn CustodialApi>> = match config.ore_id.api_key.as_deref() {
            Some(api_key) => Some(Arc::new(OreIdClient::new(
                &config.ore_id.base_url,
                api_key,
                config.ore_id.service_key.as_deref().unwrap_or_default(),
            )?)),
            None => None,
        };

        Ok(Self::with_clients(
            config,
            asaflow_dir.to_path_buf(),
            ledger,
            indexer,
            custodial,
            logger,
        ))
    }

    /// Assemble a context around existing clients
    pub fn with_clients(
        config: Config,
        asaflow_dir: PathBuf,
        ledger: Arc<dyn LedgerClient>,
        indexer: Arc<dyn IndexerClient>,
        custodial: Option<Arc<dyn CustodialApi>>,
        logger: Option<Arc<LoggingService>>,
    ) -> Self {
        let mut transfer_service = TransferService::new(Arc::clone(&ledger));
        if let Some(explorer) = &config.explorer_url {
            transfer_service = transfer_service.with_explorer_url(explorer.clone());
        }

        let asset_service = AssetQueryService::new(indexer)
            .with_retry_policy(config.retry.clone())
            .with_pacing(Duration::from_millis(config.pacing_ms));
        let status_service = StatusService::new(ledger);

        let mut custodial_service = custodial.map(|api| {
            CustodialService::new(api).with_chain_network(config.ore_id.chain_network.clone())
        });

        if let Some(logger) = &logger {
            transfer_service = transfer_service.with_logger(Arc::clone(logger));
            custodial_service = custodial_service.map(|s| s.with_logger(Arc::clone(logger)));
        }

        Self {
            config,
            asaflow_dir,
            logger,
            transfer_service,
            asset_service,
            status_service,
            custodial_service,
        }
    }

    /// Creator account with its signing key and, when configured, ORE ID login
    pub fn creator_account(&self) -> domain::result::Result<Account> {
        let account = self.config.creator_account()?;
        Ok(match self.config.ore_id.credentials() {
            Some(credentials) => account.with_ore_id(credentials),
            None => account,
        })
    }

    /// The custodial service, or a configuration error naming the missing key
    pub fn custodial(&self) -> domain::result::Result<&CustodialService> {
        self.custodial_service
            .as_ref()
            .ok_or_else(|| Error::Config("ORE_ID_API_KEY is not set".into()))
    }

    /// Transfer options from the configured defaults
    pub fn transfer_options(&self) -> TransferOptions {
        TransferOptions {
            auto_fund: self.config.transfer.auto_fund,
            fund_amount: self.config.transfer.fund_amount,
            opt_in: self.config.transfer.opt_in_policy,
            ..Default::default()
        }
    }

    /// Record the invoked command in the activity log, if it is open
    pub fn log_command(&self, command: &str) {
        if let Some(logger) = &self.logger {
            if let Err(e) = logger.log_command(command) {
                tracing::warn!("Failed to log command {}: {}", command, e);
            }
        }
    }
}
