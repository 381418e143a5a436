//! Client-credentials token authentication.

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::debug;
use url::Url;

use finbridge_core::{Error, Result};

/// Tokens are refreshed this many seconds before their declared expiry.
const EXPIRY_LEEWAY_SECS: i64 = 60;

fn default_expires_in() -> i64 {
    3600
}

/// API credentials for the token exchange.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub account_id: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Fetches and caches bearer tokens from the upstream `/token` endpoint.
#[derive(Debug)]
pub struct TokenManager {
    http: reqwest::Client,
    token_url: Url,
    credentials: Credentials,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    /// `base_url` must carry a trailing slash so joins stay inside it.
    pub fn new(http: reqwest::Client, base_url: &Url, credentials: Credentials) -> Result<Self> {
        let token_url = base_url
            .join("token")
            .map_err(|e| Error::Config(format!("invalid token URL: {e}")))?;
        Ok(Self {
            http,
            token_url,
            credentials,
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid bearer token, exchanging credentials when the
    /// cached one is missing or about to expire.
    pub async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Utc::now() < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        debug!("Requesting new access token");
        let response = self
            .http
            .post(self.token_url.clone())
            .json(&json!({
                "client_id": self.credentials.client_id,
                "client_secret": self.credentials.client_secret,
                "account_id": self.credentials.account_id,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Auth(format!(
                "token request failed with status {status}"
            )));
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = (body.expires_in - EXPIRY_LEEWAY_SECS).max(0);
        *cached = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: Utc::now() + Duration::seconds(lifetime),
        });

        Ok(body.access_token)
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

    #[tokio::test]
    async fn test_token_is_fetched_and_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok-1", "expires_in": 3600}"#)
            .expect(1)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let manager = TokenManager::new(reqwest::Client::new(), &base, credentials()).unwrap();

        assert_eq!(manager.bearer_token().await.unwrap(), "tok-1");
        // Second call hits the cache, not the server
        assert_eq!(manager.bearer_token().await.unwrap(), "tok-1");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "tok", "expires_in": 0}"#)
            .expect(2)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let manager = TokenManager::new(reqwest::Client::new(), &base, credentials()).unwrap();

        manager.bearer_token().await.unwrap();
        manager.bearer_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_credentials_surface_as_auth_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(401)
            .create_async()
            .await;

        let base = Url::parse(&format!("{}/", server.url())).unwrap();
        let manager = TokenManager::new(reqwest::Client::new(), &base, credentials()).unwrap();

        let err = manager.bearer_token().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }
}
