//! One callable tool per parsed API operation.

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

use finbridge_client::ApiClient;
use finbridge_core::{Error, Result, Tool, ToolContext, ToolResponse};
use finbridge_openapi::{is_primitive, OperationInfo, ParameterInfo};

const BODY_METHODS: &[&str] = &["POST", "PUT", "PATCH"];

/// A tool that forwards its arguments to one upstream API operation.
///
/// The schema is assembled from the operation's parameters. When a
/// consumer id is injected the `consumer_id` parameter disappears from
/// the schema and the injected value is substituted at execution time.
pub struct ApiTool {
    name: String,
    description: String,
    operation: OperationInfo,
    client: Arc<ApiClient>,
    injected_consumer_id: Option<String>,
}

impl ApiTool {
    pub fn new(
        operation: OperationInfo,
        client: Arc<ApiClient>,
        injected_consumer_id: Option<String>,
    ) -> Self {
        let name = operation.operation_id.to_lowercase();
        let description = if operation.description.is_empty() {
            format!("{} {}", operation.method, operation.endpoint)
        } else {
            operation.description.clone()
        };

        Self {
            name,
            description,
            operation,
            client,
            injected_consumer_id,
        }
    }

    fn expects_body(&self) -> bool {
        self.operation.request_schema.is_some()
            && BODY_METHODS.contains(&self.operation.method.as_str())
    }

    fn build_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        if self.injected_consumer_id.is_none() {
            properties.insert(
                "consumer_id".to_string(),
                serde_json::json!({"type": "string", "description": "The consumer ID"}),
            );
            required.push("consumer_id".to_string());
        }

        for param in &self.operation.parameters.path {
            if param.name == "consumer_id" {
                continue;
            }
            properties.insert(param.name.clone(), parameter_schema(param));
            required.push(param.name.clone());
        }

        for param in &self.operation.parameters.query {
            properties.insert(param.name.clone(), parameter_schema(param));
            if param.required {
                required.push(param.name.clone());
            }
        }

        if self.expects_body() {
            properties.insert(
                "data".to_string(),
                serde_json::json!({"type": "object", "description": "The request data"}),
            );
            required.push("data".to_string());
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

#[async_trait]
impl Tool for ApiTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        self.build_schema()
    }

    async fn execute(&self, _ctx: Arc<dyn ToolContext>, params: Value) -> Result<ToolResponse> {
        let args = params.as_object().cloned().unwrap_or_default();

        let consumer_id = match &self.injected_consumer_id {
            Some(id) => id.clone(),
            None => args
                .get("consumer_id")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::MissingParameter("consumer_id".to_string()))?,
        };

        let mut path = self.operation.endpoint.replace("{consumer_id}", &consumer_id);
        for param in &self.operation.parameters.path {
            if param.name == "consumer_id" {
                continue;
            }
            let value = args
                .get(&param.name)
                .filter(|v| !v.is_null())
                .ok_or_else(|| Error::MissingParameter(param.name.clone()))?;
            path = path.replace(&format!("{{{}}}", param.name), &value_to_string(value));
        }

        let mut query = Vec::new();
        for param in &self.operation.parameters.query {
            match args.get(&param.name).filter(|v| !v.is_null()) {
                Some(value) => query.push((param.name.clone(), value_to_string(value))),
                None if param.required => {
                    return Err(Error::MissingParameter(param.name.clone()));
                }
                None => {}
            }
        }

        let body = if self.expects_body() {
            let data = args
                .get("data")
                .filter(|v| !v.is_null())
                .ok_or_else(|| Error::MissingParameter("data".to_string()))?;
            Some(data.clone())
        } else {
            None
        };

        debug!(tool = %self.name, path = %path, "Forwarding tool call upstream");
        let result = self
            .client
            .request(&self.operation.method, &path, &query, body.as_ref())
            .await
            .map_err(|e| Error::tool_failed(&self.name, e))?;

        Ok(ToolResponse::new(result))
    }
}

fn parameter_schema(param: &ParameterInfo) -> Value {
    let mut schema = Map::new();
    // Component-typed parameters (enums) go over the wire as strings
    let json_type = if is_primitive(&param.type_name) {
        param.type_name.clone()
    } else {
        "string".to_string()
    };
    schema.insert("type".to_string(), Value::String(json_type));

    let mut description = param.description.clone();
    if !is_primitive(&param.type_name) {
        if !description.is_empty() {
            description.push(' ');
        }
        description.push_str(&format!("({})", param.type_name));
    }
    schema.insert("description".to_string(), Value::String(description));

    if !param.format.is_empty() {
        schema.insert("format".to_string(), Value::String(param.format.clone()));
    }
    if let Some(default) = &param.default {
        schema.insert("default".to_string(), default.clone());
    }

    Value::Object(schema)
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
