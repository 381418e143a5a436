//! Error types for OpenAPI parsing.

use thiserror::Error;

/// Result type for OpenAPI operations.
pub type Result<T> = std::result::Result<T, OpenApiError>;

/// Errors that can occur while loading or parsing an OpenAPI document.
#[derive(Error, Debug)]
pub enum OpenApiError {
    /// OpenAPI document parsing error
    #[error("Failed to parse OpenAPI document: {0}")]
    ParseError(String),

    /// Structurally invalid OpenAPI document
    #[error("Invalid OpenAPI document: {0}")]
    InvalidSpec(String),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
