//! Renders operation stubs into a generated source file.

use chrono::Utc;
use std::path::Path;
use tracing::info;

use finbridge_core::{FunctionConfig, Result};
use finbridge_openapi::{is_excluded, is_primitive, iter_operations, return_type, rust_type};
use finbridge_openapi::{OperationIndex, OperationInfo, ParameterInfo};

/// Emits one `pub async fn <operation_id>` per included operation.
///
/// Every stub takes the client and `consumer_id` first, then required
/// path parameters, the `data` body for POST/PUT/PATCH, and optional
/// query parameters last, delegating to `ApiClient::request`.
pub struct Generator<'a> {
    index: &'a OperationIndex,
    config: Option<&'a FunctionConfig>,
}

impl<'a> Generator<'a> {
    pub fn new(index: &'a OperationIndex) -> Self {
        Self {
            index,
            config: None,
        }
    }

    /// Restricts emission to the configured domain/kind allow-list.
    pub fn with_config(mut self, config: &'a FunctionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Renders the full generated file.
    pub fn generate(&self) -> String {
        let mut content = String::new();
        content.push_str("// Generated by `finbridge generate`. Do not edit.\n");
        content.push_str(&format!(
            "// Generated on: {}\n\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        content.push_str("use finbridge_client::ApiClient;\n");
        content.push_str("use finbridge_core::Result;\n");
        content.push_str("use serde_json::Value;\n\n");

        for (_, _, _, operation) in iter_operations(self.index) {
            if let Some(method) = self.generate_method(operation) {
                content.push_str(&method);
                content.push('\n');
            }
        }

        content
    }

    /// Renders the file and writes it to `path`, returning the number of
    /// emitted methods.
    pub fn write_to(&self, path: &Path) -> Result<usize> {
        let content = self.generate();
        std::fs::write(path, &content)?;

        let methods = content.matches("pub async fn ").count();
        info!(path = %path.display(), methods, "Generated toolkit source");
        Ok(methods)
    }

    fn generate_method(&self, operation: &OperationInfo) -> Option<String> {
        let name = operation.operation_id.to_lowercase();
        if name.is_empty() || is_excluded(&operation.operation_id) {
            return None;
        }
        if let Some(config) = self.config {
            if !config.allows_name(&name) {
                return None;
            }
        }

        let expects_body = operation.request_schema.is_some()
            && matches!(operation.method.as_str(), "POST" | "PUT" | "PATCH");

        let mut params = vec!["client: &ApiClient".to_string(), "consumer_id: &str".to_string()];
        let mut doc_args = vec!["/// * `consumer_id` (`&str`) - The consumer ID".to_string()];

        for param in &operation.parameters.path {
            if param.name == "consumer_id" {
                continue;
            }
            let rust = scalar_type(param);
            params.push(format!("{}: {}", param.name, rust));
            doc_args.push(doc_arg_line(param, rust, false));
        }

        if expects_body {
            params.push("data: Value".to_string());
            doc_args.push("/// * `data` (`Value`) - The request data".to_string());
        }

        for param in &operation.parameters.query {
            let rust = scalar_type(param);
            if param.required {
                params.push(format!("{}: {}", param.name, rust));
                doc_args.push(doc_arg_line(param, rust, false));
            } else {
                params.push(format!("{}: Option<{}>", param.name, rust));
                doc_args.push(doc_arg_line(param, rust, true));
            }
        }

        let mut method = String::new();
        let description = if operation.description.is_empty() {
            format!("{} {}", operation.method, operation.endpoint)
        } else {
            operation.description.clone()
        };
        for line in description.lines() {
            method.push_str(&format!("/// {}\n", line.trim_end()));
        }
        method.push_str("///\n/// # Arguments\n");
        for line in &doc_args {
            method.push_str(line);
            method.push('\n');
        }
        method.push_str(&format!(
            "///\n/// Upstream response type: `{}`.\n",
            return_type(operation.response_schema.as_ref())
        ));

        method.push_str(&format!("pub async fn {}(\n", name));
        for param in &params {
            method.push_str(&format!("    {},\n", param));
        }
        method.push_str(") -> Result<Value> {\n");

        method.push_str(&format!(
            "    let path = format!(\"{}\");\n",
            operation.endpoint
        ));

        if operation.parameters.query.is_empty() {
            method.push_str(&format!(
                "    client.request(\"{}\", &path, &[], {}).await\n",
                operation.method,
                if expects_body { "Some(&data)" } else { "None" }
            ));
        } else {
            method.push_str("    let mut query: Vec<(String, String)> = Vec::new();\n");
            for param in &operation.parameters.query {
                let push_value = query_value_expr(param);
                if param.required {
                    method.push_str(&format!(
                        "    query.push((\"{}\".to_string(), {}));\n",
                        param.name, push_value
                    ));
                } else {
                    method.push_str(&format!(
                        "    if let Some({name}) = {name} {{\n        query.push((\"{name}\".to_string(), {value}));\n    }}\n",
                        name = param.name,
                        value = push_value
                    ));
                }
            }
            method.push_str(&format!(
                "    client.request(\"{}\", &path, &query, {}).await\n",
                operation.method,
                if expects_body { "Some(&data)" } else { "None" }
            ));
        }

        method.push_str("}\n");
        Some(method)
    }
}

/// Signature type for a path or query parameter. Component-typed
/// parameters (enums) travel as strings.
fn scalar_type(param: &ParameterInfo) -> &'static str {
    match param.type_name.as_str() {
        "integer" => "i64",
        "boolean" => "bool",
        "number" => "f64",
        _ => "String",
    }
}

fn query_value_expr(param: &ParameterInfo) -> String {
    if scalar_type(param) == "String" {
        param.name.clone()
    } else {
        format!("{}.to_string()", param.name)
    }
}

fn doc_arg_line(param: &ParameterInfo, rust: &str, optional: bool) -> String {
    let mut line = if optional {
        format!("/// * `{}` (`Option<{}>`)", param.name, rust)
    } else {
        format!("/// * `{}` (`{}`)", param.name, rust)
    };
    if !param.description.is_empty() {
        line.push_str(&format!(" - {}", param.description));
    }
    if !is_primitive(&param.type_name) {
        line.push_str(&format!(" [{}]", param.type_name));
    }
    if let Some(default) = &param.default {
        line.push_str(&format!(" (default: {})", default));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use finbridge_core::FunctionConfig;
    use finbridge_openapi::{OpenApiParser, EXCLUDED_OPERATIONS};

    const FIXTURE: &str = r##"{
        "openapi": "3.0.3",
        "info": {"title": "Finbridge API", "version": "1.0.0"},
        "paths": {
            "/consumers/{consumer_id}/accounting/invoices": {
                "get": {
                    "operationId": "accounting_get_invoices",
                    "description": "Returns the list of invoices.",
                    "parameters": [
                        {
                            "name": "consumer_id",
                            "in": "path",
                            "required": true,
                            "schema": {"type": "string"}
                        },
                        {
                            "name": "page",
                            "in": "query",
                            "required": false,
                            "schema": {"type": "integer", "default": 1}
                        }
                    ],
                    "responses": {"200": {"description": "OK"}}
                },
                "post": {
                    "operationId": "accounting_create_invoice",
                    "description": "Creates an invoice.",
                    "requestBody": {
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/InvoiceItem"}
                            }
                        }
                    },
                    "responses": {"201": {"description": "Created"}}
                }
            },
            "/consumers/{consumer_id}/banking/accounts": {
                "get": {
                    "operationId": "banking_get_accounts",
                    "description": "Excluded upstream.",
                    "responses": {"200": {"description": "OK"}}
                }
            },
            "/consumers/{consumer_id}/commerce/orders/{order_id}": {
                "delete": {
                    "operationId": "commerce_delete_order",
                    "description": "Deletes an order.",
                    "responses": {"204": {"description": "No Content"}}
                }
            }
        }
    }"##;

    fn index() -> OperationIndex {
        OpenApiParser::from_str(FIXTURE).unwrap().parse().unwrap()
    }

    #[test]
    fn test_generates_one_stub_per_operation() {
        let index = index();
        let content = Generator::new(&index).generate();

        assert!(content.contains("pub async fn accounting_get_invoices("));
        assert!(content.contains("pub async fn accounting_create_invoice("));
        assert!(content.contains("pub async fn commerce_delete_order("));
        assert_eq!(content.matches("pub async fn ").count(), 3);
    }

    #[test]
    fn test_excluded_operations_are_never_emitted() {
        let index = index();
        let content = Generator::new(&index).generate();

        for excluded in EXCLUDED_OPERATIONS {
            assert!(!content.contains(excluded));
        }
    }

    #[test]
    fn test_config_limits_emission() {
        let index = index();
        let config = FunctionConfig::from_json(r#"{"accounting": ["get"]}"#).unwrap();
        let content = Generator::new(&index).with_config(&config).generate();

        assert!(content.contains("pub async fn accounting_get_invoices("));
        assert!(!content.contains("accounting_create_invoice"));
        assert!(!content.contains("commerce_delete_order"));
    }

    #[test]
    fn test_stub_signature_and_body() {
        let index = index();
        let content = Generator::new(&index).generate();

        // Optional query parameter becomes Option with a runtime push
        assert!(content.contains("page: Option<i64>"));
        assert!(content.contains("if let Some(page) = page {"));
        assert!(content.contains(
            "let path = format!(\"/consumers/{consumer_id}/accounting/invoices\");"
        ));

        // Body parameter appears only for POST/PUT/PATCH with a schema
        assert!(content.contains("data: Value"));
        assert!(content.contains("Some(&data)"));

        // DELETE stub documents the boolean response
        assert!(content.contains("Upstream response type: `bool`."));
    }

    #[test]
    fn test_header_and_imports() {
        let index = index();
        let content = Generator::new(&index).generate();

        assert!(content.starts_with("// Generated by `finbridge generate`."));
        assert!(content.contains("// Generated on: "));
        assert!(content.contains("use finbridge_client::ApiClient;"));
    }

    #[test]
    fn test_write_to_reports_method_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("toolkit.rs");

        let index = index();
        let written = Generator::new(&index).write_to(&path).unwrap();

        assert_eq!(written, 3);
        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .contains("pub async fn accounting_get_invoices("));
    }
}
