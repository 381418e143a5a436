//! Consumer and connection resources.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use finbridge_core::{domain_for_connection, Result, DOMAINS};

use crate::client::ApiClient;

/// A consumer registered on the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consumer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// An active connection of a consumer to an upstream integration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    /// Upstream API name, e.g. "Accounting" or "Point of Sale"
    pub api: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ApiClient {
    /// Lists all consumers on the account.
    pub async fn consumers(&self) -> Result<Vec<Consumer>> {
        let value = self.get("/consumers").await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Fetches a single consumer.
    pub async fn consumer(&self, consumer_id: &str) -> Result<Consumer> {
        let value = self.get(&format!("/consumers/{consumer_id}")).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Lists the active connections of a consumer.
    pub async fn connections(&self, consumer_id: &str) -> Result<Vec<Connection>> {
        let value = self
            .get(&format!("/consumers/{consumer_id}/connections"))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Resolves the domains a consumer can reach through its connections.
    /// Without a consumer scope every domain is reachable.
    pub async fn connection_domains(&self, consumer_id: Option<&str>) -> Result<Vec<String>> {
        let Some(consumer_id) = consumer_id else {
            return Ok(DOMAINS.iter().map(|d| d.to_string()).collect());
        };

        let mut domains = Vec::new();
        for connection in self.connections(consumer_id).await? {
            match domain_for_connection(&connection.api) {
                Some(domain) if !domains.contains(&domain.to_string()) => {
                    domains.push(domain.to_string());
                }
                Some(_) => {}
                None => warn!(api = %connection.api, "Unknown connection type"),
            }
        }
        Ok(domains)
    }
}
