//! Generic request forwarding to the upstream API.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, error, instrument};
use url::Url;

use finbridge_core::{Error, Result};

use crate::auth::{Credentials, TokenManager};

/// Authenticated client for the upstream Finbridge API.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    auth: TokenManager,
}

impl ApiClient {
    pub fn new(base_url: &str, credentials: Credentials) -> Result<Self> {
        let mut base = Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base URL '{base_url}': {e}")))?;
        // Normalize so joins append instead of replacing the last segment
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }

        let http = reqwest::Client::new();
        let auth = TokenManager::new(http.clone(), &base, credentials)?;

        Ok(Self {
            http,
            base_url: base,
            auth,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Sends an authenticated request and decodes the JSON response.
    ///
    /// A 204 yields `true`; a non-success status yields [`Error::Api`]
    /// with the response body as the message.
    #[instrument(skip(self, query, body), fields(method = method, path = path))]
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        query: &[(String, String)],
        body: Option<&Value>,
    ) -> Result<Value> {
        let url = self
            .base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| Error::InvalidParameter("path".to_string(), e.to_string()))?;
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_| Error::InvalidParameter("method".to_string(), method.to_string()))?;

        let token = self.auth.bearer_token().await?;
        let mut builder = self.http.request(method, url).bearer_auth(token);
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), "Upstream response");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), "Upstream request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                message,
            });
        }

        if status == reqwest::StatusCode::NO_CONTENT {
            return Ok(Value::Bool(true));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(value),
            // Some endpoints answer with bare text
            Err(_) => Ok(json!({ "text": String::from_utf8_lossy(&bytes) })),
        }
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request("GET", path, &[], None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            account_id: "acct".to_string(),
        }
    }

    fn token_mock(server: &mut mockito::Server) -> mockito::Mock {
        server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
            .create()
    }

    #[tokio::test]
    async fn test_request_carries_bearer_and_decodes_json() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        let mock = server
            .mock("GET", "/consumers")
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id": "c1"}]"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), credentials()).unwrap();
        let value = client.get("/consumers").await.unwrap();

        assert_eq!(value[0]["id"], "c1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_and_body_are_forwarded() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        let mock = server
            .mock("POST", "/consumers/c1/accounting/invoices")
            .match_query(mockito::Matcher::UrlEncoded("page".into(), "2".into()))
            .match_body(mockito::Matcher::Json(json!({"total": 10})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "inv-1"}"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), credentials()).unwrap();
        let query = vec![("page".to_string(), "2".to_string())];
        let value = client
            .request(
                "POST",
                "/consumers/c1/accounting/invoices",
                &query,
                Some(&json!({"total": 10})),
            )
            .await
            .unwrap();

        assert_eq!(value["id"], "inv-1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_content_maps_to_true() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        server
            .mock("DELETE", "/consumers/c1/accounting/invoices/i1")
            .with_status(204)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), credentials()).unwrap();
        let value = client
            .request("DELETE", "/consumers/c1/accounting/invoices/i1", &[], None)
            .await
            .unwrap();

        assert_eq!(value, Value::Bool(true));
    }

    #[tokio::test]
    async fn test_upstream_failure_maps_to_api_error() {
        let mut server = mockito::Server::new_async().await;
        token_mock(&mut server);
        server
            .mock("GET", "/consumers/missing")
            .with_status(404)
            .with_body("consumer not found")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), credentials()).unwrap();
        let err = client.get("/consumers/missing").await.unwrap_err();

        match err {
            Error::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "consumer not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_base_url_is_a_config_error() {
        let err = ApiClient::new("not a url", credentials()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
