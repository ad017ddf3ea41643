//! ORE ID custodial API client
//!
//! Thin transport over the ORE ID HTTP/JSON endpoints. Non-200 answers are
//! returned as-is; the custodial service decides what they mean.

use anyhow::Result;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Serialize;

use super::http::{build_client, map_request_error, normalize_base_url, read_json_body};
use crate::domain::result::Result as DomainResult;
use crate::ports::{
    ComposeActionRequest, CustodialApi, NewUserRequest, RemoteResponse, SignRequest,
    VerificationTarget,
};

const SERVICE: &str = "ORE ID";

/// Default ORE ID service endpoint
pub const ORE_ID_DEFAULT_URL: &str = "https://service.oreid.io";

/// ORE ID HTTP client
pub struct OreIdClient {
    client: Client,
    base_url: String,
    api_key: String,
    service_key: String,
}

impl std::fmt::Debug for OreIdClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OreIdClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl OreIdClient {
    pub fn new(base_url: &str, api_key: &str, service_key: &str) -> Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("ORE ID API key cannot be empty");
        }

        Ok(Self {
            client: build_client()?,
            base_url: normalize_base_url(base_url)?,
            api_key: api_key.to_string(),
            service_key: service_key.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST with the full service header set
    fn post_json<B: Serialize>(&self, path: &str, body: &B) -> DomainResult<RemoteResponse> {
        let request = self
            .client
            .post(self.url(path))
            .header("api-key", &self.api_key)
            .header("service-key", &self.service_key)
            .header("content-type", "application/json")
            .body(serde_json::to_vec(body)?);
        self.execute(request)
    }

    /// GET authenticated by the api key alone
    fn get_with_api_key(&self, path: &str, query: &[(&str, String)]) -> DomainResult<RemoteResponse> {
        let request = self
            .client
            .get(self.url(path))
            .header("api-key", &self.api_key)
            .query(query);
        self.execute(request)
    }

    fn execute(&self, request: RequestBuilder) -> DomainResult<RemoteResponse> {
        let response = request
            .send()
            .map_err(|e| map_request_error(SERVICE, e))?;
        let (status, body) = read_json_body(SERVICE, response)?;
        Ok(RemoteResponse { status, body })
    }
}

impl CustodialApi for OreIdClient {
    fn compose_action(&self, request: &ComposeActionRequest) -> DomainResult<RemoteResponse> {
        self.post_json("/api/transaction/compose-action", request)
    }

    fn sign(&self, request: &SignRequest) -> DomainResult<RemoteResponse> {
        self.post_json("/api/transaction/sign", request)
    }

    fn get_user(&self, account: &str) -> DomainResult<RemoteResponse> {
        self.get_with_api_key("/api/account/user", &[("account", account.to_string())])
    }

    fn create_user(&self, request: &NewUserRequest) -> DomainResult<RemoteResponse> {
        self.post_json("/api/custodial/new-user", request)
    }

    fn send_verification_code(&self, target: &VerificationTarget) -> DomainResult<RemoteResponse> {
        self.get_with_api_key("/api/account/login-passwordless-send-code", &target.query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_server::{MockResponse, MockServer};

    fn client(server: &MockServer) -> OreIdClient {
        OreIdClient::new(&server.base_url(), "api_test", "svc_test").unwrap()
    }

    #[test]
    fn test_reject_empty_api_key() {
        let result = OreIdClient::new(ORE_ID_DEFAULT_URL, "", "svc");
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_post_carries_service_headers() {
        let server = MockServer::start().unwrap();
        server.route(
            "POST",
            "/api/transaction/compose-action",
            MockResponse::json(200, serde_json::json!({"transactionAction": {"a": 1}})),
        );

        let response = client(&server)
            .compose_action(&ComposeActionRequest {
                chain_network: "algo_test".into(),
                chain_action_type: "AssetTransfer".into(),
                action_params: "e30=".into(),
            })
            .unwrap();
        assert!(response.is_success());

        let request = &server.requests()[0];
        assert_eq!(request.header("api-key"), Some("api_test"));
        assert_eq!(request.header("service-key"), Some("svc_test"));
        assert_eq!(request.header("content-type"), Some("application/json"));
        let body = request.json_body().unwrap();
        assert_eq!(body["chain_action_type"], "AssetTransfer");
        assert_eq!(body["action_params"], "e30=");
    }

    #[test]
    fn test_non_200_is_returned_not_raised() {
        let server = MockServer::start().unwrap();
        server.route(
            "POST",
            "/api/transaction/sign",
            MockResponse::json(400, serde_json::json!({"error": "x"})),
        );

        let response = client(&server)
            .sign(&SignRequest {
                account: "ore1abc".into(),
                broadcast: true,
                chain_account: "ADDR".into(),
                chain_network: "algo_test".into(),
                transaction: serde_json::json!({}),
                user_password: "pw".into(),
            })
            .unwrap();
        assert_eq!(response.status, 400);
        assert_eq!(response.field("error"), Some("x"));
    }

    #[test]
    fn test_get_user_sends_api_key_only() {
        let server = MockServer::start().unwrap();
        server.route(
            "GET",
            "/api/account/user",
            MockResponse::json(200, serde_json::json!({"accountName": "ore1abc"})),
        );

        let response = client(&server).get_user("ore1abc").unwrap();
        assert_eq!(response.field("accountName"), Some("ore1abc"));

        let request = &server.requests()[0];
        assert_eq!(request.query, "account=ore1abc");
        assert!(request.header("service-key").is_none());
    }

    #[test]
    fn test_send_code_query_by_provider() {
        let server = MockServer::start().unwrap();
        server.route(
            "GET",
            "/api/account/login-passwordless-send-code",
            MockResponse::json(200, serde_json::json!({"success": true})),
        );

        client(&server)
            .send_verification_code(&VerificationTarget::Phone("+15550100".into()))
            .unwrap();
        let query = &server.requests()[0].query;
        assert!(query.starts_with("provider=phone&phone="));
    }
}
