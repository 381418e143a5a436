//! HTTP client for the upstream Finbridge API.
//!
//! Handles client-credentials token authentication, the consumer and
//! connection resources, and the generic request forwarding used by
//! every generated tool.

pub mod auth;
pub mod client;
pub mod consumers;

pub use auth::{Credentials, TokenManager};
pub use client::ApiClient;
pub use consumers::{Connection, Consumer};
