//! Custodial signing port - ORE ID HTTP/JSON API

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// Raw response from the custodial service
///
/// Non-200 answers are not errors at this layer; the orchestrator inspects
/// `status` and the JSON body and decides.
#[derive(Debug, Clone)]
pub struct RemoteResponse {
    pub status: u16,
    pub body: JsonValue,
}

impl RemoteResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    /// String field of the body, if present and non-empty
    pub fn field(&self, key: &str) -> Option<&str> {
        self.body
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }
}

/// Body of `POST /api/transaction/compose-action`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeActionRequest {
    pub chain_network: String,
    pub chain_action_type: String,
    /// Base64 of the JSON action record
    pub action_params: String,
}

/// Body of `POST /api/transaction/sign`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignRequest {
    pub account: String,
    pub broadcast: bool,
    pub chain_account: String,
    pub chain_network: String,
    pub transaction: JsonValue,
    pub user_password: String,
}

/// Body of `POST /api/custodial/new-user`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub name: String,
    pub user_name: String,
    pub email: String,
    pub picture: String,
    pub user_password: String,
    pub phone: Option<String>,
    pub account_type: String,
}

/// Passwordless login channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationTarget {
    Email(String),
    Phone(String),
}

impl VerificationTarget {
    /// Query parameters for the send-code endpoint
    pub fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            VerificationTarget::Email(email) => {
                vec![("provider", "email".to_string()), ("email", email.clone())]
            }
            VerificationTarget::Phone(phone) => {
                vec![("provider", "phone".to_string()), ("phone", phone.clone())]
            }
        }
    }
}

/// ORE ID API
pub trait CustodialApi: Send + Sync {
    fn compose_action(&self, request: &ComposeActionRequest) -> Result<RemoteResponse>;

    fn sign(&self, request: &SignRequest) -> Result<RemoteResponse>;

    /// User record (`GET /api/account/user`)
    fn get_user(&self, account: &str) -> Result<RemoteResponse>;

    fn create_user(&self, request: &NewUserRequest) -> Result<RemoteResponse>;

    fn send_verification_code(&self, target: &VerificationTarget) -> Result<RemoteResponse>;
}
