//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Typed failure code carried by every failed [`OperationResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Validation,
    Config,
    NotFound,
    /// Receiver balance below the funding threshold and auto-funding is off
    InsufficientFunds,
    /// Account exists on the indexer but holds no algos
    NoFunds,
    /// Account has no `assets` record at all
    NoAssets,
    NotOptedIn,
    MissingSigningKey,
    RateLimited,
    /// Custodial service answered with a non-200 status
    RemoteRejected,
    /// Algod node refused a request or a submitted transaction
    LedgerRejected,
    ComposeFailed,
    AssetInfoMissing,
    Http,
    Encoding,
    Io,
    Json,
    Other,
}

/// Core library error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    InsufficientFunds(String),

    #[error("{0}")]
    NoFunds(String),

    #[error("Account {address} is not opted in to asset {asset_id}")]
    NotOptedIn { address: String, asset_id: u64 },

    #[error("No signing key available for {0}")]
    MissingSigningKey(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("{service} returned HTTP {status}: {message}")]
    Remote {
        service: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Map the error onto its typed code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::Validation(_) => ErrorCode::Validation,
            Error::Config(_) => ErrorCode::Config,
            Error::NotFound(_) => ErrorCode::NotFound,
            Error::InsufficientFunds(_) => ErrorCode::InsufficientFunds,
            Error::NoFunds(_) => ErrorCode::NoFunds,
            Error::NotOptedIn { .. } => ErrorCode::NotOptedIn,
            Error::MissingSigningKey(_) => ErrorCode::MissingSigningKey,
            Error::RateLimited(_) => ErrorCode::RateLimited,
            Error::Remote { service, .. } if service == "algod" => ErrorCode::LedgerRejected,
            Error::Remote { .. } => ErrorCode::RemoteRejected,
            Error::Http(_) => ErrorCode::Http,
            Error::Encoding(_) => ErrorCode::Encoding,
            Error::Io(_) => ErrorCode::Io,
            Error::Json(_) => ErrorCode::Json,
            Error::Other(_) => ErrorCode::Other,
        }
    }

    /// Whether the error belongs to the rate-limit class that may be retried
    pub fn is_rate_limit(&self) -> bool {
        match self {
            Error::RateLimited(_) => true,
            Error::Remote { status, message, .. } => {
                *status == 429 || message.to_lowercase().contains("too many requests")
            }
            _ => false,
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome of an orchestration call
///
/// Every service operation reports through this type instead of raising:
/// `success` plus a human readable `message`, the payload on success, and the
/// typed code and error text on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub message: String,
    pub data: Option<T>,
    pub error: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
            error: None,
            error_code: None,
            context: None,
        }
    }

    /// Create a failed result
    pub fn fail(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            error: Some(message.clone()),
            message,
            data: None,
            error_code: Some(code),
            context: None,
        }
    }

    /// Create a failed result from a core error
    pub fn from_error(error: &Error) -> Self {
        Self::fail(error.code(), error.to_string())
    }

    /// Attach a context value
    pub fn with_context(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.context
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value);
        self
    }
}
