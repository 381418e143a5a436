//! Environment-based configuration.
//!
//! All settings come from `FINBRIDGE_*` environment variables, with an
//! optional `.env` file loaded first. Credentials are required; the base
//! URL, consumer scope and function config have defaults.

use std::env;

use crate::domains::FunctionConfig;
use crate::error::{Error, Result};

const ENV_PREFIX: &str = "FINBRIDGE_";

/// Default upstream API base URL.
pub const DEFAULT_URL_BASE: &str = "https://api.finbridge.dev";

/// Runtime settings resolved from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub account_id: String,
    pub url_base: String,
    /// When set, every tool is scoped to this consumer and the
    /// `consumer_id` parameter is hidden from tool schemas.
    pub consumer_id: Option<String>,
    function_config: Option<FunctionConfig>,
}

impl Settings {
    /// Reads settings from the environment, loading `.env` if present.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let function_config = match optional("FUNCTION_CONFIG") {
            Some(raw) => Some(FunctionConfig::from_json(&raw)?),
            None => None,
        };

        Ok(Self {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            account_id: required("ACCOUNT_ID")?,
            url_base: optional("URL_BASE").unwrap_or_else(|| DEFAULT_URL_BASE.to_string()),
            consumer_id: optional("CONSUMER_ID"),
            function_config,
        })
    }

    /// The configured allow-list, or allow-everything when unset.
    pub fn function_config(&self) -> FunctionConfig {
        self.function_config
            .clone()
            .unwrap_or_else(FunctionConfig::allow_all)
    }
}

fn required(name: &str) -> Result<String> {
    env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::Config(format!("{ENV_PREFIX}{name} is not set")))
}

fn optional(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}
