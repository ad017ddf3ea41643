//! Shared blocking HTTP plumbing for the algod, indexer and ORE ID clients

use std::time::Duration;

use anyhow::Context;
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;

use crate::domain::result::{Error, Result};

/// Request timeout for every remote call
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Build the blocking client used by every adapter
pub fn build_client() -> anyhow::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .context("Failed to create HTTP client")
}

/// Normalize a configured base URL
pub fn normalize_base_url(base_url: &str) -> anyhow::Result<String> {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        anyhow::bail!("Base URL cannot be empty");
    }
    url::Url::parse(trimmed).with_context(|| format!("Invalid base URL: {}", trimmed))?;
    Ok(trimmed.to_string())
}

/// Map request errors to user-friendly messages
pub fn map_request_error(service: &str, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Http(format!(
            "{} request timed out after {} seconds",
            service, REQUEST_TIMEOUT_SECS
        ))
    } else if error.is_connect() {
        Error::Http(format!("Unable to connect to {}", service))
    } else {
        Error::Http(format!("{} request failed: {}", service, error))
    }
}

/// Pull the most specific error text out of a JSON error body
pub fn error_message(body: &JsonValue) -> Option<String> {
    ["message", "errorMessage", "error"]
        .iter()
        .filter_map(|key| body.get(*key).and_then(|v| v.as_str()))
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
}

/// Read the body as JSON, falling back to `{"message": <text>}` for non-JSON bodies
pub fn read_json_body(service: &str, response: Response) -> Result<(u16, JsonValue)> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .map_err(|e| map_request_error(service, e))?;
    if text.trim().is_empty() {
        return Ok((status, JsonValue::Null));
    }
    let body = serde_json::from_str(&text)
        .unwrap_or_else(|_| serde_json::json!({ "message": text.trim() }));
    Ok((status, body))
}

/// Check response status and return the matching error class
pub fn check_response_status(service: &str, response: Response) -> Result<Response> {
    let status = response.status().as_u16();
    if (200..300).contains(&status) {
        return Ok(response);
    }

    let (_, body) = read_json_body(service, response)?;
    let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));

    Err(match status {
        429 => Error::RateLimited(format!("{}: {}", service, message)),
        404 => Error::NotFound(message),
        _ => Error::Remote {
            service: service.to_string(),
            status,
            message,
        },
    })
}

/// Check the status and decode the JSON payload
pub fn parse_json<T: DeserializeOwned>(service: &str, response: Response) -> Result<T> {
    let response = check_response_status(service, response)?;
    let text = response
        .text()
        .map_err(|e| map_request_error(service, e))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse {} response", service))
        .map_err(|e| Error::Encoding(format!("{:#}", e)))
}
