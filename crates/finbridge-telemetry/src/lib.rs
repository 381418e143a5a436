//! # Finbridge Telemetry
//!
//! OpenTelemetry integration for distributed tracing and observability.
//!
//! Provides tracer initialization and structured span helpers for tool
//! dispatches, following OpenTelemetry semantic conventions for
//! generative AI tooling.

mod spans;
mod tracer;

pub use spans::{safe_serialize, trace_tool_call, ToolSpanAttributes};
pub use tracer::{init_telemetry, register_span_processor, tracer_provider};

/// OpenTelemetry span attribute constants for tool observability.
pub mod attributes {
    pub const GEN_AI_OPERATION_NAME: &str = "gen_ai.operation.name";
    pub const GEN_AI_SYSTEM: &str = "gen_ai.system";

    // Tool-specific attributes
    pub const GEN_AI_TOOL_NAME: &str = "gen_ai.tool.name";
    pub const GEN_AI_TOOL_DESCRIPTION: &str = "gen_ai.tool.description";
    pub const GEN_AI_TOOL_CALL_ID: &str = "gen_ai.tool.call.id";
    pub const GEN_AI_TOOL_CALL_ARGS: &str = "gen_ai.tool.call.args";
    pub const GEN_AI_TOOL_RESPONSE: &str = "gen_ai.tool.response";
    pub const GEN_AI_INVOCATION_ID: &str = "gen_ai.invocation.id";

    // System name constant
    pub const SYSTEM_NAME: &str = "finbridge";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_constants() {
        // Verify attribute names follow OpenTelemetry semantic conventions
        assert_eq!(attributes::GEN_AI_OPERATION_NAME, "gen_ai.operation.name");
        assert_eq!(attributes::GEN_AI_TOOL_NAME, "gen_ai.tool.name");
        assert_eq!(attributes::SYSTEM_NAME, "finbridge");
    }
}
