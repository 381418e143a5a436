use finbridge_core::ToolContext;
use uuid::Uuid;

/// Default implementation of ToolContext
#[derive(Debug, Clone)]
pub struct DefaultToolContext {
    tool_call_id: String,
    invocation_id: String,
}

impl DefaultToolContext {
    pub fn new(tool_call_id: String, invocation_id: String) -> Self {
        Self {
            tool_call_id,
            invocation_id,
        }
    }

    /// Fresh context with random identifiers, one per dispatch.
    pub fn random() -> Self {
        Self {
            tool_call_id: Uuid::new_v4().to_string(),
            invocation_id: Uuid::new_v4().to_string(),
        }
    }
}

impl ToolContext for DefaultToolContext {
    fn tool_call_id(&self) -> &str {
        &self.tool_call_id
    }

    fn invocation_id(&self) -> &str {
        &self.invocation_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_context_creation() {
        let ctx = DefaultToolContext::new("call-123".to_string(), "inv-456".to_string());

        assert_eq!(ctx.tool_call_id(), "call-123");
        assert_eq!(ctx.invocation_id(), "inv-456");
    }

    #[test]
    fn test_random_context_ids_differ() {
        let a = DefaultToolContext::random();
        let b = DefaultToolContext::random();
        assert_ne!(a.tool_call_id(), b.tool_call_id());
    }
}
