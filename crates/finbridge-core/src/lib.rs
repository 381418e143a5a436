//! Core types for the Finbridge tool bridge
//!
//! This crate provides the error taxonomy, environment configuration,
//! domain vocabulary and the tool abstractions shared by the parser,
//! client, registry and server crates.

pub mod config;
pub mod domains;
pub mod error;
pub mod traits;

// Re-exports
pub use config::Settings;
pub use domains::{FunctionConfig, OperationKind, domain_for_connection, split_tool_name, DOMAINS};
pub use error::{Error, Result};
pub use traits::{Tool, ToolContext, ToolResponse};
