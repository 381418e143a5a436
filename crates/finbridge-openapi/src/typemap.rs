//! Mapping from OpenAPI primitive type names to Rust type names.

use serde_json::Value;

/// Converts an OpenAPI type name to the Rust type used in generated
/// signatures. Unrecognized names (component types, enums) fall back to
/// a generic JSON value.
pub fn rust_type(openapi_type: &str) -> &'static str {
    match openapi_type {
        "string" => "String",
        "integer" => "i64",
        "boolean" => "bool",
        "number" => "f64",
        "object" => "serde_json::Map<String, serde_json::Value>",
        "array" => "Vec<serde_json::Value>",
        _ => "serde_json::Value",
    }
}

/// Resolves the Rust return type for a response schema. No schema means
/// the operation returns nothing.
pub fn return_type(schema: Option<&Value>) -> &'static str {
    let Some(schema) = schema else {
        return "()";
    };
    match schema.get("type").and_then(Value::as_str) {
        Some(type_name) => rust_type(type_name),
        None => "serde_json::Value",
    }
}

/// True for the OpenAPI primitive type names.
pub fn is_primitive(type_name: &str) -> bool {
    matches!(
        type_name,
        "string" | "integer" | "boolean" | "number" | "array" | "object"
    )
}
