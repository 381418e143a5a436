//! Span creation helpers for tool dispatches

use crate::attributes::*;

/// Attributes for tracing a tool call
#[derive(Debug, Clone)]
pub struct ToolSpanAttributes {
    pub tool_name: String,
    pub tool_description: String,
    pub tool_call_id: String,
    pub invocation_id: String,
    pub args_json: String,
    pub response_json: String,
}

/// Create and record an OpenTelemetry span for a tool execution.
///
/// Records the tool name, description, call id, arguments and response,
/// enabling distributed tracing of every dispatched call.
pub fn trace_tool_call(attrs: ToolSpanAttributes) {
    let span = tracing::info_span!(
        "execute_tool",
        { GEN_AI_OPERATION_NAME } = "execute_tool",
        { GEN_AI_SYSTEM } = SYSTEM_NAME,
        { GEN_AI_TOOL_NAME } = %attrs.tool_name,
        { GEN_AI_TOOL_DESCRIPTION } = %attrs.tool_description,
        { GEN_AI_TOOL_CALL_ID } = %attrs.tool_call_id,
        { GEN_AI_INVOCATION_ID } = %attrs.invocation_id,
        { GEN_AI_TOOL_CALL_ARGS } = %attrs.args_json,
        { GEN_AI_TOOL_RESPONSE } = %attrs.response_json,
    );

    // Enter and immediately exit the span (it's recorded)
    let _guard = span.enter();
}

/// Helper to safely serialize to JSON string
pub fn safe_serialize<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "<not serializable>".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_serialize() {
        let value = serde_json::json!({"test": "value"});
        let result = safe_serialize(&value);
        assert!(result.contains("test"));
        assert!(result.contains("value"));
    }

    #[test]
    fn test_tool_span_attributes() {
        let attrs = ToolSpanAttributes {
            tool_name: "accounting_get_invoices".to_string(),
            tool_description: "Returns the list of invoices".to_string(),
            tool_call_id: "call-123".to_string(),
            invocation_id: "inv-123".to_string(),
            args_json: r#"{"consumer_id": "c1"}"#.to_string(),
            response_json: r#"{"items": []}"#.to_string(),
        };

        // Just verify we can create and use the attributes
        trace_tool_call(attrs);
    }
}
