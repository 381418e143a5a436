//! Tool registration and dispatch.

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use finbridge_client::ApiClient;
use finbridge_core::{Error, FunctionConfig, Result, Tool, ToolContext, ToolResponse};
use finbridge_openapi::{iter_operations, OperationIndex};
use finbridge_telemetry::{safe_serialize, trace_tool_call, ToolSpanAttributes};

use crate::api_tool::ApiTool;
use crate::consumer_tools::consumer_tools;
use crate::context::DefaultToolContext;

/// In-memory registry of callable tools, keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = tool.name(), "Registering tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Registered tools in name order.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.values().cloned().collect()
    }

    pub fn names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Looks up a tool by name and executes it with the given arguments.
    ///
    /// An unregistered name fails with [`Error::ToolNotFound`]; execution
    /// errors propagate to the caller.
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<ToolResponse> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::ToolNotFound(name.to_string()))?;

        let ctx = Arc::new(DefaultToolContext::random());
        let args_json = safe_serialize(&args);
        let result = tool.execute(ctx.clone(), args).await;

        // Failed calls are traced too
        let response_json = match &result {
            Ok(response) => safe_serialize(&response.result),
            Err(err) => safe_serialize(&serde_json::json!({"error": err.to_string()})),
        };
        trace_tool_call(ToolSpanAttributes {
            tool_name: tool.name().to_string(),
            tool_description: tool.description().to_string(),
            tool_call_id: ctx.tool_call_id().to_string(),
            invocation_id: ctx.invocation_id().to_string(),
            args_json,
            response_json,
        });

        result
    }
}

/// Builds a [`ToolRegistry`] from an operation index, applying the
/// FunctionConfig allow-list and the consumer's connection domains.
pub struct RegistryBuilder {
    client: Arc<ApiClient>,
    index: OperationIndex,
    config: FunctionConfig,
    allowed_domains: Option<Vec<String>>,
    consumer_id: Option<String>,
}

impl RegistryBuilder {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            index: OperationIndex::new(),
            config: FunctionConfig::allow_all(),
            allowed_domains: None,
            consumer_id: None,
        }
    }

    pub fn operations(mut self, index: OperationIndex) -> Self {
        self.index = index;
        self
    }

    pub fn function_config(mut self, config: FunctionConfig) -> Self {
        self.config = config;
        self
    }

    /// Restricts registration to these domains, typically the consumer's
    /// active connection types.
    pub fn allowed_domains(mut self, domains: Option<Vec<String>>) -> Self {
        self.allowed_domains = domains;
        self
    }

    /// Scopes every tool to one consumer, hiding its `consumer_id`
    /// parameter. Without a scope the consumer management tools are
    /// registered as well.
    pub fn consumer_id(mut self, consumer_id: Option<String>) -> Self {
        self.consumer_id = consumer_id;
        self
    }

    pub fn build(self) -> Result<ToolRegistry> {
        let mut registry = ToolRegistry::new();

        for (domain, _resource, _method, operation) in iter_operations(&self.index) {
            let name = operation.operation_id.to_lowercase();
            if name.is_empty() {
                continue;
            }
            if !self.config.allows_name(&name) {
                continue;
            }
            if let Some(allowed) = &self.allowed_domains {
                if !allowed.iter().any(|d| d == domain) {
                    continue;
                }
            }
            registry.register(Arc::new(ApiTool::new(
                operation.clone(),
                self.client.clone(),
                self.consumer_id.clone(),
            )));
        }

        if self.consumer_id.is_none() {
            for tool in consumer_tools(self.client.clone())? {
                registry.register(tool);
            }
        }

        info!(tools = registry.len(), "Tool registry built");
        Ok(registry)
    }
}
