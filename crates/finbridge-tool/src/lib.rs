//! Tool layer for the Finbridge bridge.
//!
//! One [`ApiTool`] per included API operation, closure-backed
//! [`FunctionTool`]s for the built-in consumer tools, and the
//! [`ToolRegistry`] that registers and dispatches them.

pub mod api_tool;
pub mod consumer_tools;
pub mod context;
pub mod function_tool;
pub mod registry;
pub mod schema;

pub use api_tool::ApiTool;
pub use consumer_tools::consumer_tools;
pub use context::DefaultToolContext;
pub use function_tool::{FunctionTool, FunctionToolBuilder};
pub use registry::{RegistryBuilder, ToolRegistry};
pub use schema::ToolSchema;
