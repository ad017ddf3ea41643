//! Direct-signing transfers
//!
//! Builds, signs and submits transactions with locally held keys, then waits
//! for each one to confirm. The main entry point is
//! [`TransferService::fund_account_and_transfer`], which tops up the receiver
//! before moving the asset.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::confirmation::ConfirmationPoller;
use super::logging::{ActivityRecorder, LogEvent, LoggingService};
use crate::domain::result::{Error, OperationResult, Result};
use crate::domain::{
    funding_hint, Account, Address, AssetParams, AssetTransferIntent, PendingTransaction,
    PrivateKey, Transaction, TransactionReceipt, DEFAULT_FLAT_FEE, DEFAULT_FUND_AMOUNT,
    MIN_FUNDED_BALANCE,
};
use crate::ports::LedgerClient;

/// What to do about the receiver's opt-in before an asset transfer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OptInPolicy {
    /// Do not check; a missing opt-in surfaces as a ledger rejection
    #[default]
    Skip,
    /// Fail with `NotOptedIn` before submitting
    Require,
    /// Opt the receiver in with its own key when needed
    #[serde(alias = "auto")]
    AutoOptIn,
}

impl std::str::FromStr for OptInPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "require" => Ok(Self::Require),
            "auto" | "auto-opt-in" => Ok(Self::AutoOptIn),
            other => Err(Error::validation(format!(
                "Unknown opt-in policy '{}' (expected skip, require or auto)",
                other
            ))),
        }
    }
}

/// Knobs for [`TransferService::fund_account_and_transfer`]
#[derive(Debug, Clone)]
pub struct TransferOptions {
    pub auto_fund: bool,
    pub fund_amount: u64,
    pub min_balance: u64,
    pub opt_in: OptInPolicy,
    /// Receiver key, needed only for `OptInPolicy::AutoOptIn`
    pub receiver_key: Option<PrivateKey>,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            auto_fund: true,
            fund_amount: DEFAULT_FUND_AMOUNT,
            min_balance: MIN_FUNDED_BALANCE,
            opt_in: OptInPolicy::Skip,
            receiver_key: None,
        }
    }
}

impl TransferOptions {
    /// Microalgos sent when the receiver needs funding
    ///
    /// Under `AutoOptIn` the receiver pays its own opt-in fee, so it gets at
    /// least the minimum balance plus one flat fee.
    pub fn funding_amount(&self) -> u64 {
        match self.opt_in {
            OptInPolicy::AutoOptIn => self.fund_amount.max(self.min_balance + DEFAULT_FLAT_FEE),
            _ => self.fund_amount,
        }
    }
}

/// Receipts of every transaction a transfer run submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferOutcome {
    pub funding: Option<TransactionReceipt>,
    pub opt_in: Option<TransactionReceipt>,
    pub transfer: Option<TransactionReceipt>,
}

/// Result of creating an asset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedAsset {
    pub asset_id: u64,
    pub receipt: TransactionReceipt,
}

/// Direct-signing transfer orchestrator
pub struct TransferService {
    ledger: Arc<dyn LedgerClient>,
    poller: ConfirmationPoller,
    logger: Option<Arc<LoggingService>>,
    explorer_url: Option<String>,
}

impl TransferService {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self {
            poller: ConfirmationPoller::new(ledger.clone()),
            ledger,
            logger: None,
            explorer_url: None,
        }
    }

    /// Record activity in the given log
    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Base URL of a block explorer; confirmed transactions are logged as `<base>/tx/<id>`
    pub fn with_explorer_url(mut self, url: impl Into<String>) -> Self {
        self.explorer_url = Some(url.into().trim_end_matches('/').to_string());
        self
    }

    fn recorder(&self) -> ActivityRecorder {
        ActivityRecorder::new(self.logger.clone(), "direct")
    }

    /// Sign, submit and confirm one transaction
    fn submit(
        &self,
        tx: &Transaction,
        key: &PrivateKey,
        recorder: &ActivityRecorder,
        kind: &str,
    ) -> Result<(String, PendingTransaction)> {
        let signed = tx.sign(key)?;
        let tx_id = self.ledger.send_raw_transaction(&signed.bytes)?;
        if tx_id != signed.tx_id {
            tracing::warn!("Node reported id {} for transaction {}", tx_id, signed.tx_id);
        }
        tracing::info!("Submitted {} transaction {}", kind, tx_id);
        recorder.record(LogEvent::new(format!("{}_submitted", kind)).with_tx(&tx_id));

        let pending = self.poller.wait_for_confirmation(&tx_id)?;
        let round = pending.confirmed_round.unwrap_or_default();
        recorder.record(
            LogEvent::new(format!("{}_confirmed", kind))
                .with_tx(&tx_id)
                .with_round(round),
        );
        if let Some(base) = &self.explorer_url {
            tracing::info!("Transaction lookup: {}/tx/{}", base, tx_id);
        }

        Ok((tx_id, pending))
    }

    fn receipt(tx_id: String, pending: &PendingTransaction) -> TransactionReceipt {
        TransactionReceipt {
            tx_id,
            confirmed_round: pending.confirmed_round.unwrap_or_default(),
        }
    }

    fn pay(
        &self,
        sender: &Account,
        receiver: &Address,
        amount: u64,
        recorder: &ActivityRecorder,
        kind: &str,
    ) -> Result<TransactionReceipt> {
        let key = sender.signer()?;
        let params = self.ledger.suggested_params()?;
        let tx = Transaction::payment(&params, sender.address, *receiver, amount)?;
        let (tx_id, pending) = self.submit(&tx, key, recorder, kind)?;
        Ok(Self::receipt(tx_id, &pending))
    }

    fn opt_in(
        &self,
        key: &PrivateKey,
        asset_id: u64,
        recorder: &ActivityRecorder,
    ) -> Result<TransactionReceipt> {
        let params = self.ledger.suggested_params()?;
        let tx = Transaction::asset_opt_in(&params, key.address(), asset_id)?;
        let (tx_id, pending) = self.submit(&tx, key, recorder, "asset_opt_in")?;
        Ok(Self::receipt(tx_id, &pending))
    }

    fn send_asset(
        &self,
        creator: &Account,
        receiver: &Address,
        amount: u64,
        asset_id: u64,
        recorder: &ActivityRecorder,
    ) -> Result<TransactionReceipt> {
        let key = creator.signer()?;
        let params = self.ledger.suggested_params()?;
        let tx = Transaction::asset_transfer(&params, creator.address, *receiver, asset_id, amount)?;
        let (tx_id, pending) = self.submit(&tx, key, recorder, "asset_transfer")?;
        Ok(Self::receipt(tx_id, &pending))
    }

    /// Apply the opt-in precondition for `receiver`
    fn ensure_opt_in(
        &self,
        receiver: &Address,
        asset_id: u64,
        options: &TransferOptions,
        recorder: &ActivityRecorder,
    ) -> Result<Option<TransactionReceipt>> {
        if options.opt_in == OptInPolicy::Skip {
            return Ok(None);
        }

        let info = self.ledger.account_information(receiver)?;
        if info.holding(asset_id).is_some() {
            return Ok(None);
        }

        // Without the receiver's key there is no way to opt it in
        match (options.opt_in, &options.receiver_key) {
            (OptInPolicy::AutoOptIn, Some(key)) => {
                if key.address() != *receiver {
                    return Err(Error::MissingSigningKey(receiver.to_string()));
                }
                tracing::info!("Opting in account {} to asset {}", receiver, asset_id);
                self.opt_in(key, asset_id, recorder).map(Some)
            }
            _ => Err(Error::NotOptedIn {
                address: receiver.to_string(),
                asset_id,
            }),
        }
    }

    fn run_fund_and_transfer(
        &self,
        creator: &Account,
        intent: &AssetTransferIntent,
        options: &TransferOptions,
        recorder: &ActivityRecorder,
        outcome: &mut TransferOutcome,
    ) -> Result<()> {
        let receiver = &intent.receiver;
        let balance = self.ledger.account_information(receiver)?.amount;

        if balance < options.min_balance {
            if !options.auto_fund {
                return Err(Error::InsufficientFunds(funding_hint(&receiver.to_string())));
            }

            let fund_amount = options.funding_amount();
            tracing::info!(
                "Receiver {} holds {} microalgos, funding with {}",
                receiver,
                balance,
                fund_amount
            );
            outcome.funding = Some(self.pay(creator, receiver, fund_amount, recorder, "funding")?);

            let funded = self.ledger.account_information(receiver)?.amount;
            if funded < options.min_balance {
                return Err(Error::InsufficientFunds(format!(
                    "Account {} holds {} microalgos after funding, below the {} minimum",
                    receiver, funded, options.min_balance
                )));
            }
        }

        outcome.opt_in = self.ensure_opt_in(receiver, intent.asset_id, options, recorder)?;
        outcome.transfer = Some(self.send_asset(
            creator,
            receiver,
            intent.amount,
            intent.asset_id,
            recorder,
        )?);
        Ok(())
    }

    /// Make sure `receiver` is funded, then transfer `amount` of `asset_id` to it
    pub fn fund_account_and_transfer(
        &self,
        creator: &Account,
        receiver: &Address,
        amount: u64,
        asset_id: u64,
        options: &TransferOptions,
    ) -> OperationResult<TransferOutcome> {
        let recorder = self.recorder();
        let mut outcome = TransferOutcome::default();

        let intent = AssetTransferIntent {
            asset_id,
            amount,
            sender: creator.address,
            receiver: *receiver,
        };

        match self.run_fund_and_transfer(creator, &intent, options, &recorder, &mut outcome) {
            Ok(()) => {
                let tx_id = outcome
                    .transfer
                    .as_ref()
                    .map(|r| r.tx_id.clone())
                    .unwrap_or_default();
                OperationResult::ok(format!("ASA Transfer Success in txn : {}", tx_id), outcome)
                    .with_context("operation_id", recorder.operation_id().to_string().into())
            }
            Err(e) => {
                let message = match &e {
                    Error::InsufficientFunds(m) => m.clone(),
                    _ => format!("ASA Transfer Fail for account: {}: {}", receiver, e),
                };
                tracing::error!("{}", message);
                recorder.record(
                    LogEvent::new("asset_transfer_failed")
                        .with_asset(asset_id)
                        .with_error(e.to_string()),
                );

                let mut result = OperationResult::fail(e.code(), message)
                    .with_context("operation_id", recorder.operation_id().to_string().into());
                if let Some(funding) = &outcome.funding {
                    result = result.with_context("funding_tx_id", funding.tx_id.clone().into());
                }
                if let Some(opt_in) = &outcome.opt_in {
                    result = result.with_context("opt_in_tx_id", opt_in.tx_id.clone().into());
                }
                result
            }
        }
    }

    /// Plain payment of `amount` microalgos
    pub fn payment(
        &self,
        sender: &Account,
        receiver: &Address,
        amount: u64,
    ) -> OperationResult<TransactionReceipt> {
        let recorder = self.recorder();
        match self.pay(sender, receiver, amount, &recorder, "payment") {
            Ok(receipt) => OperationResult::ok(
                format!(
                    "Payment Transfer of amount {} Success in txn : {}",
                    amount, receipt.tx_id
                ),
                receipt,
            ),
            Err(e) => {
                tracing::error!("Payment to {} failed: {}", receiver, e);
                recorder.record(LogEvent::new("payment_failed").with_error(e.to_string()));
                OperationResult::fail(
                    e.code(),
                    format!(
                        "Payment Transfer of amount {} fail for account: {}: {}",
                        amount, receiver, e
                    ),
                )
            }
        }
    }

    /// Opt `account` in to `asset_id` (zero-amount self transfer)
    pub fn asset_opt_in(
        &self,
        account: &Account,
        asset_id: u64,
    ) -> OperationResult<TransactionReceipt> {
        let recorder = self.recorder();
        let result = account
            .signer()
            .and_then(|key| self.opt_in(key, asset_id, &recorder));

        match result {
            Ok(receipt) => OperationResult::ok(
                format!("ASA Opt In Success in txn : {}", receipt.tx_id),
                receipt,
            ),
            Err(e) => {
                tracing::error!("Opt-in of {} to {} failed: {}", account.address, asset_id, e);
                recorder.record(
                    LogEvent::new("asset_opt_in_failed")
                        .with_asset(asset_id)
                        .with_error(e.to_string()),
                );
                OperationResult::fail(
                    e.code(),
                    format!(
                        "Error while ASA Opt in for account: {}: {}",
                        account.address, e
                    ),
                )
            }
        }
    }

    fn run_create_asset(
        &self,
        creator: &Account,
        params: AssetParams,
        recorder: &ActivityRecorder,
    ) -> Result<CreatedAsset> {
        let key = creator.signer()?;
        let suggested = self.ledger.suggested_params()?;
        let tx = Transaction::asset_create(&suggested, creator.address, params)?;
        let (tx_id, pending) = self.submit(&tx, key, recorder, "asset_create")?;

        let asset_id = pending.asset_index.ok_or_else(|| {
            Error::Other(format!("Transaction {} confirmed without an asset index", tx_id))
        })?;
        Ok(CreatedAsset {
            asset_id,
            receipt: Self::receipt(tx_id, &pending),
        })
    }

    /// Create a new asset owned by `creator`
    pub fn create_asset(&self, creator: &Account, params: AssetParams) -> OperationResult<CreatedAsset> {
        let recorder = self.recorder();
        match self.run_create_asset(creator, params, &recorder) {
            Ok(created) => {
                recorder.record(
                    LogEvent::new("asset_created")
                        .with_tx(&created.receipt.tx_id)
                        .with_asset(created.asset_id),
                );
                OperationResult::ok(
                    format!(
                        "Asset {} created in txn : {}",
                        created.asset_id, created.receipt.tx_id
                    ),
                    created,
                )
            }
            Err(e) => {
                tracing::error!("Unsuccessful creation of asset: {}", e);
                recorder.record(LogEvent::new("asset_create_failed").with_error(e.to_string()));
                OperationResult::from_error(&e)
            }
        }
    }

    fn run_transfer_asset(
        &self,
        creator: &Account,
        receiver: &Account,
        amount: u64,
        asset_id: u64,
        recorder: &ActivityRecorder,
        outcome: &mut TransferOutcome,
    ) -> Result<()> {
        let info = self.ledger.account_information(&receiver.address)?;
        if info.amount == 0 {
            return Err(Error::NoFunds(funding_hint(&receiver.address.to_string())));
        }

        if info.holding(asset_id).is_none() {
            tracing::info!("Opt in account {}", receiver.address);
            let key = receiver.signer()?;
            outcome.opt_in = Some(self.opt_in(key, asset_id, recorder)?);
        }

        outcome.transfer = Some(self.send_asset(
            creator,
            &receiver.address,
            amount,
            asset_id,
            recorder,
        )?);
        Ok(())
    }

    /// Transfer to a receiver whose key is held locally
    ///
    /// The receiver must already hold algos; it is opted in with its own key
    /// when it does not yet hold the asset. No funding payment is made.
    pub fn transfer_asset(
        &self,
        creator: &Account,
        receiver: &Account,
        amount: u64,
        asset_id: u64,
    ) -> OperationResult<TransferOutcome> {
        let recorder = self.recorder();
        let mut outcome = TransferOutcome::default();

        match self.run_transfer_asset(creator, receiver, amount, asset_id, &recorder, &mut outcome) {
            Ok(()) => {
                let tx_id = outcome
                    .transfer
                    .as_ref()
                    .map(|r| r.tx_id.clone())
                    .unwrap_or_default();
                OperationResult::ok(format!("ASA Transfer Success in txn : {}", tx_id), outcome)
            }
            Err(e) => {
                let message = match &e {
                    Error::NoFunds(m) => m.clone(),
                    _ => format!("ASA Transfer Fail for account: {}: {}", receiver.address, e),
                };
                tracing::error!("{}", message);
                recorder.record(
                    LogEvent::new("asset_transfer_failed")
                        .with_asset(asset_id)
                        .with_error(e.to_string()),
                );
                let mut result = OperationResult::fail(e.code(), message);
                if let Some(opt_in) = &outcome.opt_in {
                    result = result.with_context("opt_in_tx_id", opt_in.tx_id.clone().into());
                }
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockResponse, MockServer};
    use crate::adapters::AlgodClient;
    use crate::domain::result::ErrorCode;
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;
    use serde_bytes::ByteBuf;

    #[derive(Deserialize)]
    struct SentTxn {
        #[serde(rename = "type")]
        tx_type: String,
        #[serde(default)]
        amt: u64,
        #[serde(default)]
        aamt: u64,
        snd: ByteBuf,
    }

    #[derive(Deserialize)]
    struct SentEnvelope {
        txn: SentTxn,
    }

    /// Transactions posted to the node, in submission order
    fn submitted(server: &MockServer) -> Vec<SentTxn> {
        server
            .requests()
            .into_iter()
            .filter(|r| r.method == "POST" && r.path == "/v2/transactions")
            .map(|r| rmp_serde::from_slice::<SentEnvelope>(&r.body).unwrap().txn)
            .collect()
    }

    fn holding_response(address: &Address, amount: u64, asset_id: u64) -> MockResponse {
        MockResponse::json(
            200,
            serde_json::json!({
                "address": address.to_string(),
                "amount": amount,
                "assets": [{"asset-id": asset_id, "amount": 0, "is-frozen": false}]
            }),
        )
    }

    fn route_submissions(server: &MockServer, tx_ids: &[&str]) {
        server.route("GET", "/v2/transactions/params", params_response());
        server.route_sequence(
            "POST",
            "/v2/transactions",
            tx_ids
                .iter()
                .map(|id| MockResponse::json(200, serde_json::json!({"txId": id})))
                .collect(),
        );
        route_confirmed(server, tx_ids);
    }

    fn params_response() -> MockResponse {
        MockResponse::json(
            200,
            serde_json::json!({
                "fee": 0,
                "genesis-hash": BASE64.encode([1u8; 32]),
                "genesis-id": "testnet-v1.0",
                "last-round": 50,
                "min-fee": 1000
            }),
        )
    }

    fn account_response(address: &Address, amount: u64) -> MockResponse {
        MockResponse::json(
            200,
            serde_json::json!({"address": address.to_string(), "amount": amount}),
        )
    }

    fn service(server: &MockServer) -> TransferService {
        TransferService::new(Arc::new(AlgodClient::new(&server.base_url(), "tok").unwrap()))
    }

    fn route_confirmed(server: &MockServer, tx_ids: &[&str]) {
        server.route(
            "GET",
            "/v2/status",
            MockResponse::json(200, serde_json::json!({"last-round": 50})),
        );
        for tx_id in tx_ids {
            server.route(
                "GET",
                &format!("/v2/transactions/pending/{}", tx_id),
                MockResponse::json(200, serde_json::json!({"confirmed-round": 51})),
            );
        }
    }

    #[test]
    fn test_opt_in_policy_parse() {
        assert_eq!("auto".parse::<OptInPolicy>().unwrap(), OptInPolicy::AutoOptIn);
        assert_eq!("Require".parse::<OptInPolicy>().unwrap(), OptInPolicy::Require);
        assert!("maybe".parse::<OptInPolicy>().is_err());
        assert_eq!(OptInPolicy::default(), OptInPolicy::Skip);
    }

    #[test]
    fn test_funded_receiver_gets_single_transfer() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();

        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 500_000),
        );
        server.route("GET", "/v2/transactions/params", params_response());
        server.route(
            "POST",
            "/v2/transactions",
            MockResponse::json(200, serde_json::json!({"txId": "XFER"})),
        );
        route_confirmed(&server, &["XFER"]);

        let result = service(&server).fund_account_and_transfer(
            &creator,
            &receiver,
            10,
            96230975,
            &TransferOptions::default(),
        );

        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "ASA Transfer Success in txn : XFER");
        let outcome = result.data.unwrap();
        assert!(outcome.funding.is_none());
        assert_eq!(outcome.transfer.unwrap().confirmed_round, 51);
        assert_eq!(server.count("/v2/transactions"), 1);
    }

    #[test]
    fn test_unfunded_receiver_without_auto_fund_submits_nothing() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 0),
        );

        let options = TransferOptions {
            auto_fund: false,
            ..TransferOptions::default()
        };
        let result = service(&server).fund_account_and_transfer(&creator, &receiver, 10, 1, &options);

        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::InsufficientFunds));
        assert!(result
            .message
            .starts_with(&format!("No initial amount found on Account: {}", receiver)));
        assert_eq!(server.count("/v2/transactions"), 0);
    }

    #[test]
    fn test_ledger_rejection_is_reported_not_raised() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 300_000),
        );
        server.route("GET", "/v2/transactions/params", params_response());
        server.route(
            "POST",
            "/v2/transactions",
            MockResponse::json(400, serde_json::json!({"message": "receiver not opted in"})),
        );

        let result = service(&server).fund_account_and_transfer(
            &creator,
            &receiver,
            10,
            7,
            &TransferOptions::default(),
        );
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::LedgerRejected));
        assert!(result.message.contains("ASA Transfer Fail for account"));
    }

    #[test]
    fn test_require_policy_blocks_unopted_receiver() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 300_000),
        );

        let options = TransferOptions {
            opt_in: OptInPolicy::Require,
            ..TransferOptions::default()
        };
        let result = service(&server).fund_account_and_transfer(&creator, &receiver, 1, 7, &options);
        assert_eq!(result.error_code, Some(ErrorCode::NotOptedIn));
        assert_eq!(server.count("/v2/transactions"), 0);
    }

    #[test]
    fn test_watch_only_creator_cannot_pay() {
        let server = MockServer::start().unwrap();
        let creator = Account::new(PrivateKey::generate().address());
        let receiver = PrivateKey::generate().address();

        let result = service(&server).payment(&creator, &receiver, 5);
        assert_eq!(result.error_code, Some(ErrorCode::MissingSigningKey));
        assert!(server.requests().is_empty());
    }

    #[test]
    fn test_payment_success_message() {
        let server = MockServer::start().unwrap();
        let sender = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();
        server.route("GET", "/v2/transactions/params", params_response());
        server.route(
            "POST",
            "/v2/transactions",
            MockResponse::json(200, serde_json::json!({"txId": "PAY"})),
        );
        route_confirmed(&server, &["PAY"]);

        let result = service(&server).payment(&sender, &receiver, 200_000);
        assert!(result.success);
        assert_eq!(
            result.message,
            "Payment Transfer of amount 200000 Success in txn : PAY"
        );
    }

    #[test]
    fn test_create_asset_returns_index() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        server.route("GET", "/v2/transactions/params", params_response());
        server.route(
            "POST",
            "/v2/transactions",
            MockResponse::json(200, serde_json::json!({"txId": "ACFG"})),
        );
        server.route(
            "GET",
            "/v2/status",
            MockResponse::json(200, serde_json::json!({"last-round": 50})),
        );
        server.route(
            "GET",
            "/v2/transactions/pending/ACFG",
            MockResponse::json(
                200,
                serde_json::json!({"confirmed-round": 51, "asset-index": 4242}),
            ),
        );

        let result = service(&server).create_asset(
            &creator,
            AssetParams {
                total: 10,
                unit_name: "TST".into(),
                asset_name: "Test".into(),
                ..AssetParams::default()
            },
        );
        assert!(result.success, "{}", result.message);
        assert_eq!(result.data.unwrap().asset_id, 4242);
    }

    #[test]
    fn test_funding_amount_covers_opt_in_fee() {
        let auto = TransferOptions {
            opt_in: OptInPolicy::AutoOptIn,
            ..TransferOptions::default()
        };
        assert_eq!(auto.funding_amount(), MIN_FUNDED_BALANCE + DEFAULT_FLAT_FEE);
        assert_eq!(TransferOptions::default().funding_amount(), DEFAULT_FUND_AMOUNT);

        let generous = TransferOptions {
            fund_amount: 1_000_000,
            ..auto
        };
        assert_eq!(generous.funding_amount(), 1_000_000);
    }

    #[test]
    fn test_auto_opt_in_opts_in_before_transfer() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver_key = PrivateKey::generate();
        let receiver = receiver_key.address();
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 500_000),
        );
        route_submissions(&server, &["OPTIN", "XFER"]);

        let options = TransferOptions {
            opt_in: OptInPolicy::AutoOptIn,
            receiver_key: Some(receiver_key),
            ..TransferOptions::default()
        };
        let result = service(&server).fund_account_and_transfer(&creator, &receiver, 10, 7, &options);

        assert!(result.success, "{}", result.message);
        let outcome = result.data.unwrap();
        assert!(outcome.funding.is_none());
        assert_eq!(outcome.opt_in.unwrap().tx_id, "OPTIN");
        assert_eq!(outcome.transfer.unwrap().tx_id, "XFER");

        let sent = submitted(&server);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].tx_type, "axfer");
        assert_eq!(sent[0].aamt, 0);
        assert_eq!(sent[0].snd.as_slice(), receiver.as_bytes());
        assert_eq!(sent[1].tx_type, "axfer");
        assert_eq!(sent[1].aamt, 10);
        assert_eq!(sent[1].snd.as_slice(), creator.address.as_bytes());
    }

    #[test]
    fn test_auto_opt_in_funds_fresh_receiver_for_its_fee() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver_key = PrivateKey::generate();
        let receiver = receiver_key.address();
        server.route_sequence(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            vec![
                account_response(&receiver, 0),
                account_response(&receiver, 201_000),
            ],
        );
        route_submissions(&server, &["FUND", "OPTIN", "XFER"]);

        let options = TransferOptions {
            opt_in: OptInPolicy::AutoOptIn,
            receiver_key: Some(receiver_key),
            ..TransferOptions::default()
        };
        let result = service(&server).fund_account_and_transfer(&creator, &receiver, 10, 7, &options);
        assert!(result.success, "{}", result.message);

        let sent = submitted(&server);
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[0].tx_type, "pay");
        assert_eq!(sent[0].amt, 201_000);
        assert_eq!(sent[1].aamt, 0);
        assert_eq!(sent[1].snd.as_slice(), receiver.as_bytes());
        assert_eq!(sent[2].aamt, 10);
    }

    #[test]
    fn test_auto_opt_in_without_receiver_key_is_not_opted_in() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = PrivateKey::generate().address();
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver),
            account_response(&receiver, 500_000),
        );

        let options = TransferOptions {
            opt_in: OptInPolicy::AutoOptIn,
            ..TransferOptions::default()
        };
        let result = service(&server).fund_account_and_transfer(&creator, &receiver, 10, 7, &options);

        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::NotOptedIn));
        assert_eq!(server.count("/v2/transactions"), 0);
    }

    #[test]
    fn test_asset_opt_in_reports_round() {
        let server = MockServer::start().unwrap();
        let account = Account::from_private_key(PrivateKey::generate());
        route_submissions(&server, &["OPTIN"]);

        let result = service(&server).asset_opt_in(&account, 7);

        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "ASA Opt In Success in txn : OPTIN");
        assert_eq!(result.data.unwrap().confirmed_round, 51);
        let sent = submitted(&server);
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].tx_type, "axfer");
        assert_eq!(sent[0].aamt, 0);
        assert_eq!(sent[0].snd.as_slice(), account.address.as_bytes());
    }

    #[test]
    fn test_transfer_asset_to_opted_in_receiver() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = Account::from_private_key(PrivateKey::generate());
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver.address),
            holding_response(&receiver.address, 300_000, 7),
        );
        route_submissions(&server, &["XFER"]);

        let result = service(&server).transfer_asset(&creator, &receiver, 10, 7);

        assert!(result.success, "{}", result.message);
        assert_eq!(result.message, "ASA Transfer Success in txn : XFER");
        let outcome = result.data.unwrap();
        assert!(outcome.opt_in.is_none());
        assert_eq!(outcome.transfer.unwrap().confirmed_round, 51);
        assert_eq!(submitted(&server).len(), 1);
    }

    #[test]
    fn test_transfer_asset_opts_in_with_receiver_key() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = Account::from_private_key(PrivateKey::generate());
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver.address),
            account_response(&receiver.address, 300_000),
        );
        route_submissions(&server, &["OPTIN", "XFER"]);

        let result = service(&server).transfer_asset(&creator, &receiver, 10, 7);

        assert!(result.success, "{}", result.message);
        let sent = submitted(&server);
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].snd.as_slice(), receiver.address.as_bytes());
        assert_eq!(sent[1].snd.as_slice(), creator.address.as_bytes());
    }

    #[test]
    fn test_transfer_asset_needs_existing_balance() {
        let server = MockServer::start().unwrap();
        let creator = Account::from_private_key(PrivateKey::generate());
        let receiver = Account::from_private_key(PrivateKey::generate());
        server.route(
            "GET",
            &format!("/v2/accounts/{}", receiver.address),
            account_response(&receiver.address, 0),
        );

        let result = service(&server).transfer_asset(&creator, &receiver, 10, 7);

        assert_eq!(result.error_code, Some(ErrorCode::NoFunds));
        assert!(result.message.starts_with("No initial amount found on Account"));
        assert_eq!(server.count("/v2/transactions"), 0);
    }
}
