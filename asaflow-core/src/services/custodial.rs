//! Custodial signing through ORE ID
//!
//! The service never sees a key. An intent is encoded as an opaque action
//! payload, composed into a chain transaction by ORE ID, then signed (and
//! optionally broadcast) with the user's ORE ID password. Remote failures are
//! logged field by field and reported in the result; nothing is raised.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::logging::{ActivityRecorder, LogEvent, LoggingService};
use crate::domain::result::{Error, ErrorCode, OperationResult, Result};
use crate::domain::{AssetTransferIntent, OreIdCredentials};
use crate::ports::{
    ComposeActionRequest, CustodialApi, NewUserRequest, RemoteResponse, SignRequest,
    VerificationTarget,
};

/// Chain network ORE ID composes against by default
pub const DEFAULT_CHAIN_NETWORK: &str = "algo_test";

/// Fields ORE ID uses to explain a failure
const ERROR_FIELDS: [&str; 3] = ["error", "message", "errorMessage"];

/// Kind of chain action ORE ID should compose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChainActionType {
    AssetTransfer,
    ValueTransfer,
    AppNoOp,
}

impl ChainActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainActionType::AssetTransfer => "AssetTransfer",
            ChainActionType::ValueTransfer => "ValueTransfer",
            ChainActionType::AppNoOp => "AppNoOp",
        }
    }
}

impl std::str::FromStr for ChainActionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "assettransfer" => Ok(Self::AssetTransfer),
            "valuetransfer" => Ok(Self::ValueTransfer),
            "appnoop" => Ok(Self::AppNoOp),
            _ => Err(Error::validation(format!("Unknown chain action type: {}", s))),
        }
    }
}

/// Action record ORE ID composes into a transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferAction {
    pub from_account_name: String,
    pub to_account_name: String,
    pub amount: u64,
    pub symbol: String,
    pub asset_index: u64,
}

impl TransferAction {
    pub fn from_intent(intent: &AssetTransferIntent) -> Self {
        Self {
            from_account_name: intent.sender.to_string(),
            to_account_name: intent.receiver.to_string(),
            amount: intent.amount,
            symbol: "algo".to_string(),
            asset_index: intent.asset_id,
        }
    }
}

/// Base64 of the JSON action record, as `action_params` expects
pub fn encode_action_params(action: &TransferAction) -> Result<String> {
    let json = serde_json::to_vec(action)?;
    Ok(BASE64.encode(json))
}

/// Options of the sign call
#[derive(Debug, Clone)]
pub struct SignOptions {
    pub broadcast: bool,
    pub chain_account: String,
    pub chain_network: String,
}

impl Default for SignOptions {
    fn default() -> Self {
        Self {
            broadcast: true,
            chain_account: String::new(),
            chain_network: DEFAULT_CHAIN_NETWORK.to_string(),
        }
    }
}

/// Details for a new custodial user
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub picture: Option<String>,
    pub password: String,
    pub phone: Option<String>,
    pub account_type: Option<String>,
}

impl NewUser {
    /// "first last" when either is given, otherwise the email
    pub fn full_name(&self) -> String {
        if self.first_name.is_some() || self.last_name.is_some() {
            format!(
                "{} {}",
                self.first_name.as_deref().unwrap_or_default(),
                self.last_name.as_deref().unwrap_or_default()
            )
            .trim()
            .to_string()
        } else {
            self.email.clone()
        }
    }

    fn to_request(&self) -> NewUserRequest {
        NewUserRequest {
            name: self.full_name(),
            user_name: self.email.clone(),
            email: self.email.clone(),
            picture: self.picture.clone().unwrap_or_default(),
            user_password: self.password.clone(),
            phone: self.phone.clone(),
            account_type: self
                .account_type
                .clone()
                .unwrap_or_else(|| "native".to_string()),
        }
    }
}

/// Identifiers returned for a newly created user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedUser {
    pub account_name: Option<String>,
    pub process_id: Option<String>,
}

/// ORE ID orchestrator
pub struct CustodialService {
    api: Arc<dyn CustodialApi>,
    chain_network: String,
    logger: Option<Arc<LoggingService>>,
}

impl CustodialService {
    pub fn new(api: Arc<dyn CustodialApi>) -> Self {
        Self {
            api,
            chain_network: DEFAULT_CHAIN_NETWORK.to_string(),
            logger: None,
        }
    }

    /// Chain network used when composing actions
    pub fn with_chain_network(mut self, network: impl Into<String>) -> Self {
        self.chain_network = network.into();
        self
    }

    pub fn with_logger(mut self, logger: Arc<LoggingService>) -> Self {
        self.logger = Some(logger);
        self
    }

    fn recorder(&self) -> ActivityRecorder {
        ActivityRecorder::new(self.logger.clone(), "ore_id")
    }

    /// Log every error field present in a failed response and pick the best message
    fn report_failure(&self, what: &str, response: &RemoteResponse) -> String {
        tracing::warn!(
            "Facing issue while {} (HTTP {}): {}",
            what,
            response.status,
            response.body
        );
        for key in ERROR_FIELDS {
            if let Some(value) = response.field(key) {
                tracing::error!("Facing error while {}: {}", what, value);
            }
        }
        ["errorMessage", "message", "error"]
            .iter()
            .find_map(|key| response.field(key))
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("{} failed with HTTP {}", what, response.status))
    }

    fn remote_failure<T>(&self, what: &str, response: &RemoteResponse) -> OperationResult<T> {
        let message = self.report_failure(what, response);
        OperationResult::fail(ErrorCode::RemoteRejected, message)
            .with_context("status", response.status.into())
            .with_context("response", response.body.clone())
    }

    fn transport_failure<T>(&self, what: &str, error: &Error) -> OperationResult<T> {
        tracing::error!("Facing error while {}: {}", what, error);
        OperationResult::from_error(error)
    }

    /// Compose an action into an unsigned chain transaction
    ///
    /// Returns the whole compose response; `transactionAction` inside it is what
    /// the sign call needs.
    pub fn compose_transaction(
        &self,
        action: &TransferAction,
        chain_action_type: ChainActionType,
    ) -> OperationResult<JsonValue> {
        let action_params = match encode_action_params(action) {
            Ok(p) => p,
            Err(e) => return OperationResult::from_error(&e),
        };
        let request = ComposeActionRequest {
            chain_network: self.chain_network.clone(),
            chain_action_type: chain_action_type.as_str().to_string(),
            action_params,
        };

        match self.api.compose_action(&request) {
            Ok(response) if response.is_success() => {
                tracing::info!("Compose transaction successful");
                OperationResult::ok("Compose transaction successful", response.body)
            }
            Ok(response) => self.remote_failure("composing transaction", &response),
            Err(e) => self.transport_failure("composing transaction", &e),
        }
    }

    /// Compose, then sign (and broadcast) an action with the user's credentials
    pub fn sign_transaction(
        &self,
        credentials: &OreIdCredentials,
        action: &TransferAction,
        chain_action_type: ChainActionType,
        options: &SignOptions,
    ) -> OperationResult<JsonValue> {
        let recorder = self.recorder();

        let composed = self.compose_transaction(action, chain_action_type);
        let transaction = composed
            .data
            .as_ref()
            .and_then(|body| body.get("transactionAction"))
            .filter(|v| !v.is_null())
            .cloned();
        let Some(transaction) = transaction else {
            let detail = composed.error.unwrap_or_else(|| "missing transactionAction".into());
            recorder.record(
                LogEvent::new("ore_compose_failed")
                    .with_asset(action.asset_index)
                    .with_error(detail.clone()),
            );
            return OperationResult::fail(
                ErrorCode::ComposeFailed,
                format!("Sign transaction fail: {}", detail),
            );
        };

        let request = SignRequest {
            account: credentials.account.clone(),
            broadcast: options.broadcast,
            chain_account: options.chain_account.clone(),
            chain_network: options.chain_network.clone(),
            transaction,
            user_password: credentials.password.clone(),
        };

        let result = match self.api.sign(&request) {
            Ok(response) if response.is_success() => {
                tracing::info!("ORE ID transaction signed: {}", response.body);
                let mut event = LogEvent::new("ore_sign_succeeded").with_asset(action.asset_index);
                if let Some(tx_id) = response.field("transactionId") {
                    event = event.with_tx(tx_id);
                }
                recorder.record(event);
                OperationResult::ok("Transaction signed successfully", response.body)
            }
            Ok(response) => {
                let result = self.remote_failure("ORE sign transaction", &response);
                recorder.record(
                    LogEvent::new("ore_sign_failed")
                        .with_asset(action.asset_index)
                        .with_error(result.message.clone())
                        .with_error_details(format!("HTTP {}", response.status)),
                );
                result
            }
            Err(e) => {
                recorder.record(
                    LogEvent::new("ore_sign_failed")
                        .with_asset(action.asset_index)
                        .with_error(e.to_string()),
                );
                self.transport_failure("ORE sign transaction", &e)
            }
        };
        result.with_context("operation_id", recorder.operation_id().to_string().into())
    }

    /// User record for an ORE ID account name
    pub fn get_user(&self, account: &str) -> OperationResult<JsonValue> {
        match self.api.get_user(account) {
            Ok(response) if response.is_success() => {
                tracing::info!("Fetched ORE ID user {}", account);
                OperationResult::ok("User found", response.body)
            }
            Ok(response) => self.remote_failure("getting ORE account", &response),
            Err(e) => self.transport_failure("getting ORE account", &e),
        }
    }

    /// Create a custodial user
    pub fn create_user(&self, user: &NewUser) -> OperationResult<CreatedUser> {
        if user.email.trim().is_empty() || user.password.is_empty() {
            return OperationResult::fail(
                ErrorCode::Validation,
                "Email and password are required to create a user",
            );
        }

        match self.api.create_user(&user.to_request()) {
            Ok(response) if response.is_success() => {
                tracing::info!("ORE ID account created");
                let created = CreatedUser {
                    account_name: response.field("accountName").map(str::to_string),
                    process_id: response.field("processId").map(str::to_string),
                };
                OperationResult::ok("Account created successfully", created)
            }
            Ok(response) => self.remote_failure("creating ORE account", &response),
            Err(e) => self.transport_failure("creating ORE account", &e),
        }
    }

    /// Send a passwordless login code to exactly one of `email` or `phone`
    pub fn send_verification_code(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> OperationResult<JsonValue> {
        let email = email.filter(|s| !s.is_empty());
        let phone = phone.filter(|s| !s.is_empty());
        let target = match (email, phone) {
            (Some(e), None) => VerificationTarget::Email(e.to_string()),
            (None, Some(p)) => VerificationTarget::Phone(p.to_string()),
            _ => {
                return OperationResult::fail(
                    ErrorCode::Validation,
                    "Please provide either email or phone",
                )
            }
        };

        match self.api.send_verification_code(&target) {
            Ok(response) if response.is_success() => {
                tracing::info!("Verification code sent");
                OperationResult::ok("Verification code sent", response.body)
            }
            Ok(response) => self.remote_failure("sending ORE account verification code", &response),
            Err(e) => self.transport_failure("sending ORE account verification code", &e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockResponse, MockServer};
    use crate::adapters::OreIdClient;
    use crate::domain::PrivateKey;

    fn service(server: &MockServer) -> CustodialService {
        let client = OreIdClient::new(&server.base_url(), "api_test", "svc_test").unwrap();
        CustodialService::new(Arc::new(client))
    }

    fn credentials() -> OreIdCredentials {
        OreIdCredentials {
            account: "ore1abc".into(),
            password: "pw".into(),
        }
    }

    fn action() -> TransferAction {
        TransferAction::from_intent(&AssetTransferIntent {
            asset_id: 96230975,
            amount: 10,
            sender: PrivateKey::generate().address(),
            receiver: PrivateKey::generate().address(),
        })
    }

    fn route_compose(server: &MockServer) {
        server.route(
            "POST",
            "/api/transaction/compose-action",
            MockResponse::json(
                200,
                serde_json::json!({"transactionAction": {"chain": "algo_test", "tx": 1}}),
            ),
        );
    }

    #[test]
    fn test_encode_action_params_is_base64_json() {
        let action = action();
        let encoded = encode_action_params(&action).unwrap();
        let decoded: JsonValue = serde_json::from_slice(&BASE64.decode(encoded).unwrap()).unwrap();
        assert_eq!(decoded["amount"], 10);
        assert_eq!(decoded["symbol"], "algo");
        assert_eq!(decoded["assetIndex"], 96230975);
        assert_eq!(decoded["fromAccountName"], action.from_account_name.as_str());
    }

    #[test]
    fn test_chain_action_type_parse() {
        assert_eq!(
            "asset-transfer".parse::<ChainActionType>().unwrap(),
            ChainActionType::AssetTransfer
        );
        assert_eq!("AppNoOp".parse::<ChainActionType>().unwrap(), ChainActionType::AppNoOp);
        assert!("burn".parse::<ChainActionType>().is_err());
    }

    #[test]
    fn test_sign_success() {
        let server = MockServer::start().unwrap();
        route_compose(&server);
        server.route(
            "POST",
            "/api/transaction/sign",
            MockResponse::json(200, serde_json::json!({"transactionId": "TX1"})),
        );

        let options = SignOptions {
            chain_account: "RECEIVER".into(),
            ..SignOptions::default()
        };
        let result = service(&server).sign_transaction(
            &credentials(),
            &action(),
            ChainActionType::AssetTransfer,
            &options,
        );
        assert!(result.success);
        assert_eq!(result.data.unwrap()["transactionId"], "TX1");

        let sign = server
            .requests()
            .into_iter()
            .find(|r| r.path == "/api/transaction/sign")
            .unwrap();
        let body = sign.json_body().unwrap();
        assert_eq!(body["transaction"]["tx"], 1);
        assert_eq!(body["account"], "ore1abc");
        assert_eq!(body["user_password"], "pw");
        assert_eq!(body["broadcast"], true);
        assert_eq!(body["chain_account"], "RECEIVER");
        assert_eq!(body["chain_network"], "algo_test");
    }

    #[test]
    fn test_sign_rejected_is_failure_not_error() {
        let server = MockServer::start().unwrap();
        route_compose(&server);
        server.route(
            "POST",
            "/api/transaction/sign",
            MockResponse::json(400, serde_json::json!({"error": "x"})),
        );

        let result = service(&server).sign_transaction(
            &credentials(),
            &action(),
            ChainActionType::AssetTransfer,
            &SignOptions::default(),
        );
        assert!(!result.success);
        assert_eq!(result.error_code, Some(ErrorCode::RemoteRejected));
        assert_eq!(result.message, "x");
        assert_eq!(result.context.unwrap()["status"], 400);
    }

    #[test]
    fn test_compose_without_transaction_action_skips_sign() {
        let server = MockServer::start().unwrap();
        server.route(
            "POST",
            "/api/transaction/compose-action",
            MockResponse::json(400, serde_json::json!({"message": "invalid action"})),
        );

        let result = service(&server).sign_transaction(
            &credentials(),
            &action(),
            ChainActionType::AssetTransfer,
            &SignOptions::default(),
        );
        assert_eq!(result.error_code, Some(ErrorCode::ComposeFailed));
        assert!(result.message.contains("invalid action"));
        assert_eq!(server.count("/api/transaction/sign"), 0);
    }

    #[test]
    fn test_compose_sends_configured_network() {
        let server = MockServer::start().unwrap();
        route_compose(&server);

        let result = service(&server)
            .with_chain_network("algo_main")
            .compose_transaction(&action(), ChainActionType::ValueTransfer);
        assert!(result.success);

        let body = server.requests()[0].json_body().unwrap();
        assert_eq!(body["chain_network"], "algo_main");
        assert_eq!(body["chain_action_type"], "ValueTransfer");
    }

    #[test]
    fn test_create_user_name_fallback() {
        let user = NewUser {
            email: "a@b.c".into(),
            password: "pw".into(),
            ..NewUser::default()
        };
        assert_eq!(user.full_name(), "a@b.c");

        let user = NewUser {
            first_name: Some("Ada".into()),
            ..user
        };
        assert_eq!(user.full_name(), "Ada");
    }

    #[test]
    fn test_create_user_returns_ids() {
        let server = MockServer::start().unwrap();
        server.route(
            "POST",
            "/api/custodial/new-user",
            MockResponse::json(
                200,
                serde_json::json!({"accountName": "ore1new", "processId": "p-1"}),
            ),
        );

        let result = service(&server).create_user(&NewUser {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            email: "ada@example.com".into(),
            password: "pw".into(),
            ..NewUser::default()
        });
        let created = result.data.unwrap();
        assert_eq!(created.account_name.as_deref(), Some("ore1new"));
        assert_eq!(created.process_id.as_deref(), Some("p-1"));

        let body = server.requests()[0].json_body().unwrap();
        assert_eq!(body["name"], "Ada Lovelace");
        assert_eq!(body["user_name"], "ada@example.com");
        assert_eq!(body["account_type"], "native");
    }

    #[test]
    fn test_send_code_requires_exactly_one_target() {
        let server = MockServer::start().unwrap();
        let svc = service(&server);

        let both = svc.send_verification_code(Some("a@b.c"), Some("+1"));
        assert_eq!(both.error_code, Some(ErrorCode::Validation));
        let neither = svc.send_verification_code(None, None);
        assert_eq!(neither.error_code, Some(ErrorCode::Validation));
        assert!(server.requests().is_empty());
    }
}
