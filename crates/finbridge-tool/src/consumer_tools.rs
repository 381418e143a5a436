//! Built-in consumer management tools, registered when the server is
//! not scoped to a single consumer.

use serde_json::Value;
use std::sync::Arc;

use finbridge_client::ApiClient;
use finbridge_core::{Error, Result, Tool, ToolResponse};

use crate::function_tool::FunctionTool;
use crate::schema::ToolSchema;

fn consumer_id_arg(params: &Value) -> Result<String> {
    params
        .get("consumer_id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::MissingParameter("consumer_id".to_string()))
}

/// The `consumers`, `get_consumer` and `consumer_connections` tools.
pub fn consumer_tools(client: Arc<ApiClient>) -> Result<Vec<Arc<dyn Tool>>> {
    let list_client = client.clone();
    let consumers = FunctionTool::builder()
        .name("consumers")
        .description("Get list of available consumers.")
        .schema(ToolSchema::new().build())
        .execute(move |_ctx, _params| {
            let client = list_client.clone();
            async move {
                let consumers = client.consumers().await?;
                Ok(ToolResponse::new(serde_json::to_value(consumers)?))
            }
        })
        .build()?;

    let get_client = client.clone();
    let get_consumer = FunctionTool::builder()
        .name("get_consumer")
        .description("Get specific consumer by ID.")
        .schema(
            ToolSchema::new()
                .property("consumer_id", "string", "The consumer ID")
                .required("consumer_id")
                .build(),
        )
        .execute(move |_ctx, params| {
            let client = get_client.clone();
            async move {
                let consumer_id = consumer_id_arg(&params)?;
                let consumer = client.consumer(&consumer_id).await?;
                Ok(ToolResponse::new(serde_json::to_value(consumer)?))
            }
        })
        .build()?;

    let connections_client = client.clone();
    let consumer_connections = FunctionTool::builder()
        .name("consumer_connections")
        .description("Get list of connections for a specific consumer.")
        .schema(
            ToolSchema::new()
                .property("consumer_id", "string", "The consumer ID")
                .required("consumer_id")
                .build(),
        )
        .execute(move |_ctx, params| {
            let client = connections_client.clone();
            async move {
                let consumer_id = consumer_id_arg(&params)?;
                let connections = client.connections(&consumer_id).await?;
                Ok(ToolResponse::new(serde_json::to_value(connections)?))
            }
        })
        .build()?;

    Ok(vec![
        Arc::new(consumers),
        Arc::new(get_consumer),
        Arc::new(consumer_connections),
    ])
}
