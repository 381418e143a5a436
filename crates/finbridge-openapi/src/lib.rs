//! OpenAPI document parsing for the Finbridge API.
//!
//! Turns an upstream OpenAPI document into an operation index keyed by
//! domain, resource and SDK method, ready for stub generation and tool
//! registration.

pub mod error;
pub mod parser;
pub mod typemap;
pub mod types;

pub use error::{OpenApiError, Result};
pub use parser::{is_excluded, OpenApiParser, EXCLUDED_OPERATIONS};
pub use typemap::{is_primitive, return_type, rust_type};
pub use types::{
    iter_operations, OperationIndex, OperationInfo, OperationParameters, ParameterInfo, SdkMethod,
};
