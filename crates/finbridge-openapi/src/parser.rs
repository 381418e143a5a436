//! OpenAPI document parser.
//!
//! Walks an upstream OpenAPI v3 document and builds the operation index
//! used for stub generation and tool registration. Only paths under the
//! `/consumers/{consumer_id}/<domain>/<resource>` shape yield operations;
//! the consumer management endpoints map to the `account`/`consumer`
//! pseudo-domain.

use crate::error::{OpenApiError, Result};
use crate::types::{OperationIndex, OperationInfo, OperationParameters, ParameterInfo, SdkMethod};
use openapiv3::{OpenAPI, Operation, Parameter, ParameterSchemaOrContent, ReferenceOr};
use serde_json::{json, Value};
use tracing::{debug, warn};

/// Operation ids that are never emitted or registered.
pub const EXCLUDED_OPERATIONS: &[&str] = &[
    "banking_get_account_transactions",
    "datastores_create_consumer_datastoredata",
    "syncs_get_syncconsumer",
    "datastores_update_consumer_datastoredata",
    "datastores_delete_consumer_datastoredata",
    "banking_get_account_counterparts",
    "banking_get_accounts",
    "banking_get_financial_institutions",
];

/// True when the operation id is on the static denylist.
pub fn is_excluded(operation_id: &str) -> bool {
    EXCLUDED_OPERATIONS.contains(&operation_id)
}

/// Parser for upstream OpenAPI documents.
pub struct OpenApiParser {
    spec: OpenAPI,
}

impl OpenApiParser {
    /// Load and parse an OpenAPI document from a file.
    ///
    /// Supports both JSON and YAML formats.
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let spec = if path.ends_with(".json") {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };

        Ok(Self { spec })
    }

    /// Load and parse an OpenAPI document from a URL.
    pub async fn from_url(url: &str) -> Result<Self> {
        let response = reqwest::get(url).await?;
        let content = response.text().await?;

        // Try JSON first, then YAML
        let spec = serde_json::from_str(&content).or_else(|_| serde_yaml::from_str(&content))?;

        Ok(Self { spec })
    }

    /// Parse an OpenAPI document from a string.
    ///
    /// Automatically detects JSON or YAML format.
    pub fn from_str(content: &str) -> Result<Self> {
        let spec = serde_json::from_str(content)
            .or_else(|_| serde_yaml::from_str(content))
            .map_err(|e| OpenApiError::ParseError(e.to_string()))?;

        Ok(Self { spec })
    }

    /// Builds the domain → resource → SDK method operation index.
    pub fn parse(&self) -> Result<OperationIndex> {
        let mut index = OperationIndex::new();

        for (path, path_item_ref) in &self.spec.paths.paths {
            let path_item = match path_item_ref {
                ReferenceOr::Item(item) => item,
                ReferenceOr::Reference { .. } => {
                    warn!("Path references not supported: {}", path);
                    continue;
                }
            };

            let Some((domain, resource)) = extract_domain_resource(path) else {
                continue;
            };

            let methods = [
                ("get", &path_item.get),
                ("post", &path_item.post),
                ("put", &path_item.put),
                ("delete", &path_item.delete),
                ("patch", &path_item.patch),
            ];

            for (method_name, operation_opt) in methods {
                let Some(operation) = operation_opt else {
                    continue;
                };
                let Some(sdk_method) = SdkMethod::from_http(method_name, path) else {
                    continue;
                };

                let operation_id = operation.operation_id.clone().unwrap_or_default();
                if is_excluded(&operation_id) {
                    debug!("Skipping excluded operation: {}", operation_id);
                    continue;
                }

                let info =
                    self.parse_operation(operation, path, method_name, &path_item.parameters);
                index
                    .entry(domain.clone())
                    .or_default()
                    .entry(resource.clone())
                    .or_default()
                    .insert(sdk_method, info);
            }
        }

        debug!(
            "Parsed {} domains from OpenAPI document",
            index.len()
        );
        Ok(index)
    }

    fn parse_operation(
        &self,
        operation: &Operation,
        path: &str,
        method: &str,
        path_level_params: &[ReferenceOr<Parameter>],
    ) -> OperationInfo {
        let description = operation
            .description
            .as_ref()
            .or(operation.summary.as_ref())
            .cloned()
            .unwrap_or_default();

        let mut parameters = OperationParameters::default();
        for param_ref in path_level_params.iter().chain(&operation.parameters) {
            let param = match param_ref {
                ReferenceOr::Item(p) => p,
                ReferenceOr::Reference { .. } => {
                    warn!("Parameter references not supported");
                    continue;
                }
            };
            match param {
                Parameter::Path { parameter_data, .. } => {
                    if let Some(info) = parse_parameter(parameter_data) {
                        parameters.path.push(info);
                    }
                }
                Parameter::Query { parameter_data, .. } => {
                    if let Some(info) = parse_parameter(parameter_data) {
                        parameters.query.push(info);
                    }
                }
                // Header and cookie parameters are handled by the client
                _ => {}
            }
        }

        let request_schema = extract_request_schema(operation).map(clean_schema_refs);
        let response_schema = extract_response_schema(operation).map(clean_schema_refs);

        OperationInfo {
            endpoint: path.to_string(),
            method: method.to_uppercase(),
            description,
            operation_id: operation.operation_id.clone().unwrap_or_default(),
            tags: operation.tags.clone(),
            parameters,
            request_schema,
            response_schema,
        }
    }
}

/// Splits a path into its domain and resource segments.
///
/// `/consumers/{id}/<domain>/<resource>...` yields `(domain, resource)`;
/// `/consumers` and other `/consumers/{...` paths yield the
/// `account`/`consumer` pseudo-domain; everything else yields nothing.
fn extract_domain_resource(path: &str) -> Option<(String, String)> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.first() != Some(&"consumers") {
        return None;
    }

    if segments.len() >= 4
        && segments[1].starts_with('{')
        && !segments[2].starts_with('{')
        && !segments[3].starts_with('{')
    {
        let resource = segments[3].split('{').next().unwrap_or_default();
        if !resource.is_empty() {
            return Some((segments[2].to_string(), resource.replace('-', "_")));
        }
    }

    if segments.len() == 1 || segments.get(1).is_some_and(|s| s.starts_with('{')) {
        return Some(("account".to_string(), "consumer".to_string()));
    }

    None
}

fn parse_parameter(data: &openapiv3::ParameterData) -> Option<ParameterInfo> {
    let schema_json = match &data.format {
        ParameterSchemaOrContent::Schema(schema_ref) => match schema_ref {
            ReferenceOr::Item(schema) => serde_json::to_value(schema).unwrap_or_default(),
            ReferenceOr::Reference { reference } => json!({ "allOf": [{ "$ref": reference }] }),
        },
        ParameterSchemaOrContent::Content(_) => {
            warn!("Content-typed parameter '{}' not supported", data.name);
            return Some(ParameterInfo {
                name: data.name.clone(),
                required: data.required,
                type_name: "string".to_string(),
                format: String::new(),
                description: data.description.clone().unwrap_or_default(),
                default: None,
            });
        }
    };

    Some(ParameterInfo {
        name: data.name.clone(),
        required: data.required,
        type_name: resolve_schema_type(&schema_json),
        format: schema_json
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        description: data.description.clone().unwrap_or_default(),
        default: schema_json.get("default").cloned(),
    })
}

/// Resolves the type name of a parameter schema. An `allOf` wrapping a
/// `$ref` resolves to the referenced component name.
fn resolve_schema_type(schema: &Value) -> String {
    if let Some(first) = schema.get("allOf").and_then(Value::as_array).and_then(|a| a.first()) {
        if let Some(reference) = first.get("$ref").and_then(Value::as_str) {
            return reference.rsplit('/').next().unwrap_or(reference).to_string();
        }
    }
    schema
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("string")
        .to_string()
}

fn extract_request_schema(operation: &Operation) -> Option<Value> {
    let request_body = match operation.request_body.as_ref()? {
        ReferenceOr::Item(body) => body,
        ReferenceOr::Reference { .. } => {
            warn!("Request body references not supported");
            return None;
        }
    };
    let media_type = request_body.content.get("application/json")?;
    schema_ref_to_value(media_type.schema.as_ref()?)
}

/// Picks the response schema from the first of 200/201/202/204.
/// A 204 maps to a boolean schema.
fn extract_response_schema(operation: &Operation) -> Option<Value> {
    for code in [200u16, 201, 202, 204] {
        let Some(response_ref) = operation
            .responses
            .responses
            .get(&openapiv3::StatusCode::Code(code))
        else {
            continue;
        };
        if code == 204 {
            return Some(json!({ "type": "boolean" }));
        }
        let response = match response_ref {
            ReferenceOr::Item(response) => response,
            ReferenceOr::Reference { .. } => return None,
        };
        return response
            .content
            .get("application/json")
            .and_then(|media_type| media_type.schema.as_ref())
            .and_then(schema_ref_to_value);
    }
    None
}

fn schema_ref_to_value(schema_ref: &ReferenceOr<openapiv3::Schema>) -> Option<Value> {
    match schema_ref {
        ReferenceOr::Item(schema) => serde_json::to_value(schema).ok(),
        ReferenceOr::Reference { reference } => Some(json!({ "$ref": reference })),
    }
}

/// Rewrites `$ref`s into plain `type` names, recursing through array
/// items and object properties.
fn clean_schema_refs(schema: Value) -> Value {
    let Value::Object(mut map) = schema else {
        return schema;
    };

    if let Some(Value::String(reference)) = map.remove("$ref") {
        map.insert(
            "type".to_string(),
            Value::String(transform_class_name(&reference)),
        );
    }

    let is_array = map.get("type").and_then(Value::as_str) == Some("array");
    if is_array {
        if let Some(items) = map.remove("items") {
            map.insert("items".to_string(), clean_schema_refs(items));
        }
    }

    if let Some(Value::Object(properties)) = map.remove("properties") {
        let cleaned = properties
            .into_iter()
            .map(|(key, prop)| (key, clean_schema_refs(prop)))
            .collect();
        map.insert("properties".to_string(), Value::Object(cleaned));
    }

    Value::Object(map)
}

/// Normalizes a component reference into a bare type name.
fn transform_class_name(reference: &str) -> String {
    let mut class_name = reference
        .rsplit('/')
        .next()
        .unwrap_or(reference)
        .to_string();

    // Module-qualified names ("a__b__Invoice") collapse to PascalCase
    if class_name.contains("__") {
        class_name = class_name
            .split("__")
            .flat_map(|part| part.split('_'))
            .map(capitalize)
            .collect();
    }

    // Names like "ProductItem - Input" lose spaces and dashes
    class_name = class_name
        .replace('-', " ")
        .split_whitespace()
        .collect::<String>();

    // Generic suffix forms ("Page_Invoice_") collapse to the container
    // plus its first argument
    if class_name.ends_with('_') && class_name.contains('_') {
        let parts: Vec<&str> = class_name.split('_').collect();
        if parts.len() >= 3 {
            return format!("{}{}", parts[0], parts[1]);
        }
    }

    class_name
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
