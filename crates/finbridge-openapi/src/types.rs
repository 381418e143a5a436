//! Data structures for the parsed operation index.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// SDK-level method a parsed operation maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdkMethod {
    /// GET on a collection path
    All,
    /// GET on an item path
    Get,
    /// POST
    Create,
    /// PUT or PATCH
    Update,
    /// DELETE
    Delete,
}

impl SdkMethod {
    /// Maps an HTTP verb to its SDK method, using the final path segment
    /// to distinguish collection GETs from item GETs.
    pub fn from_http(http_method: &str, path: &str) -> Option<Self> {
        let is_collection = !path.rsplit('/').next().unwrap_or("").contains('{');
        match http_method.to_ascii_lowercase().as_str() {
            "get" if is_collection => Some(SdkMethod::All),
            "get" => Some(SdkMethod::Get),
            "post" => Some(SdkMethod::Create),
            "put" | "patch" => Some(SdkMethod::Update),
            "delete" => Some(SdkMethod::Delete),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SdkMethod::All => "all",
            SdkMethod::Get => "get",
            SdkMethod::Create => "create",
            SdkMethod::Update => "update",
            SdkMethod::Delete => "delete",
        }
    }
}

impl fmt::Display for SdkMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single path or query parameter of an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name from the document
    pub name: String,
    /// Whether the parameter is required
    pub required: bool,
    /// Resolved type name (OpenAPI primitive or component name)
    pub type_name: String,
    /// Format hint (e.g. "date", "uuid"), empty when absent
    pub format: String,
    /// Description of the parameter
    pub description: String,
    /// Default value declared in the schema
    pub default: Option<Value>,
}

/// Operation parameters categorized by location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationParameters {
    pub path: Vec<ParameterInfo>,
    pub query: Vec<ParameterInfo>,
}

/// One parsed operation of the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationInfo {
    /// Path template (e.g. "/consumers/{consumer_id}/accounting/invoices")
    pub endpoint: String,
    /// HTTP method, uppercase
    pub method: String,
    /// Description, falling back to the summary
    pub description: String,
    /// Operation id from the document
    pub operation_id: String,
    /// Tags from the document
    pub tags: Vec<String>,
    /// Categorized parameters
    pub parameters: OperationParameters,
    /// JSON request body schema, `$ref`s cleaned to plain type names
    pub request_schema: Option<Value>,
    /// Response schema from the first of 200/201/202/204
    pub response_schema: Option<Value>,
}

/// Parsed operations indexed by domain, resource and SDK method.
pub type OperationIndex = BTreeMap<String, BTreeMap<String, BTreeMap<SdkMethod, OperationInfo>>>;

/// Flattens the index into (domain, resource, method, operation) tuples.
pub fn iter_operations(
    index: &OperationIndex,
) -> impl Iterator<Item = (&str, &str, SdkMethod, &OperationInfo)> {
    index.iter().flat_map(|(domain, resources)| {
        resources.iter().flat_map(move |(resource, methods)| {
            methods
                .iter()
                .map(move |(method, op)| (domain.as_str(), resource.as_str(), *method, op))
        })
    })
}
