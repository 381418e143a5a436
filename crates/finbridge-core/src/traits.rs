use super::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Tool trait - abstraction for callable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name of the tool
    fn name(&self) -> &str;

    /// Returns a description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's parameters
    fn schema(&self) -> serde_json::Value;

    /// Executes the tool with given parameters
    async fn execute(
        &self,
        ctx: Arc<dyn ToolContext>,
        params: serde_json::Value,
    ) -> Result<ToolResponse>;
}

/// Per-invocation context handed to a tool.
pub trait ToolContext: Send + Sync {
    /// Identifier for the dispatch that triggered this call
    fn invocation_id(&self) -> &str;

    /// Identifier for this specific tool call
    fn tool_call_id(&self) -> &str;
}

/// Tool execution response
#[derive(Debug, Clone)]
pub struct ToolResponse {
    pub result: serde_json::Value,
}

impl ToolResponse {
    pub fn new(result: serde_json::Value) -> Self {
        Self { result }
    }
}
