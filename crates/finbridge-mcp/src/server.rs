//! MCP server implementation over the tool registry.

use std::sync::Arc;

use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool as McpTool,
};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::transport::stdio;
use rmcp::{ErrorData as McpError, ServerHandler, ServiceExt};
use serde_json::Value;
use tracing::{debug, info};

use finbridge_core::Error;
use finbridge_tool::ToolRegistry;

const INSTRUCTIONS: &str = "Tools for the Finbridge unified financial API. Each tool forwards \
to one upstream operation; consumer management tools are available when the server is not \
scoped to a single consumer.";

/// MCP server handler backed by a [`ToolRegistry`].
#[derive(Clone)]
pub struct FinbridgeServer {
    registry: Arc<ToolRegistry>,
}

impl FinbridgeServer {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    /// The MCP tool descriptors for every registered tool.
    pub fn mcp_tools(&self) -> Vec<McpTool> {
        self.registry
            .tools()
            .into_iter()
            .map(|tool| {
                let schema = match tool.schema() {
                    Value::Object(map) => map,
                    _ => serde_json::Map::new(),
                };
                McpTool::new(
                    tool.name().to_string(),
                    tool.description().to_string(),
                    Arc::new(schema),
                )
            })
            .collect()
    }
}

impl ServerHandler for FinbridgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::default(),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        let tools = self.mcp_tools();
        debug!(count = tools.len(), "Listing tools");
        Ok(ListToolsResult {
            tools,
            next_cursor: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let args = request
            .arguments
            .map(Value::Object)
            .unwrap_or_else(|| serde_json::json!({}));

        match self.registry.dispatch(&request.name, args).await {
            Ok(response) => {
                let text = serde_json::to_string_pretty(&response.result)
                    .map_err(|e| McpError::internal_error(e.to_string(), None))?;
                Ok(CallToolResult::success(vec![Content::text(text)]))
            }
            Err(Error::ToolNotFound(name)) => {
                Err(McpError::invalid_params(format!("unknown tool: {name}"), None))
            }
            Err(Error::MissingParameter(name)) => Err(McpError::invalid_params(
                format!("missing required parameter: {name}"),
                None,
            )),
            Err(err) => Err(McpError::internal_error(err.to_string(), None)),
        }
    }
}

/// Runs the server over stdio until the client disconnects.
pub async fn serve_stdio(server: FinbridgeServer) -> anyhow::Result<()> {
    info!("Starting MCP server on stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbridge_core::{Result, Tool, ToolContext, ToolResponse};
    use async_trait::async_trait;

    struct StaticTool;

    #[async_trait]
    impl Tool for StaticTool {
        fn name(&self) -> &str {
            "accounting_get_invoices"
        }

        fn description(&self) -> &str {
            "Returns the list of invoices."
        }

        fn schema(&self) -> Value {
            serde_json::json!({"type": "object", "properties": {}, "required": []})
        }

        async fn execute(&self, _ctx: Arc<dyn ToolContext>, _params: Value) -> Result<ToolResponse> {
            Ok(ToolResponse::new(serde_json::json!({"items": []})))
        }
    }

    #[test]
    fn test_mcp_tools_reflect_registry() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(StaticTool));

        let server = FinbridgeServer::new(Arc::new(registry));
        let tools = server.mcp_tools();

        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "accounting_get_invoices");
        assert!(tools[0].input_schema.contains_key("properties"));
    }

    #[test]
    fn test_get_info_advertises_tools() {
        let server = FinbridgeServer::new(Arc::new(ToolRegistry::new()));
        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.is_some());
    }
}
