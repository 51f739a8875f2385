//! Parsing OpenAPI documents into the flat operation list the editor works
//! with.
//!
//! This is deliberately not a full OpenAPI model: the editor only needs each
//! operation's id, method, path and parameters. Anything without an
//! `operationId` is unusable as an Arazzo step target and is skipped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SourceLoadError;

/// HTTP methods an OpenAPI path item can carry, in scan order.
pub const HTTP_METHODS: [&str; 8] = [
    "get", "post", "put", "patch", "delete", "options", "head", "trace",
];

/// Everything extracted from one source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedSource {
    pub source_name: String,
    #[serde(default)]
    pub operations: Vec<Operation>,
}

impl ParsedSource {
    /// A source that contributed nothing, e.g. a document without paths.
    pub fn empty(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            operations: Vec::new(),
        }
    }
}

/// One invocable operation from an OpenAPI document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub operation_id: String,
    /// Upper-cased HTTP method, e.g. `GET`.
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<OperationParameter>,
}

/// A parameter of an operation. Request bodies are lifted into a synthetic
/// parameter named `body` so the editor can treat all inputs uniformly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationParameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

/// Parses a source document given as text, accepting JSON or YAML.
pub fn parse_text(text: &str, source_name: &str) -> Result<ParsedSource, SourceLoadError> {
    let document: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(_) => {
            serde_yaml::from_str(text).map_err(|err| SourceLoadError::Decode(err.to_string()))?
        }
    };
    Ok(parse_document(&document, source_name))
}

/// Walks `paths` x methods and collects every operation that declares an
/// `operationId`. Path-level parameters are merged into each operation's
/// own, and a `requestBody` becomes the synthetic `body` parameter.
///
/// Documents without a `paths` object yield an empty source rather than an
/// error; an API that exposes nothing is not a load failure.
pub fn parse_document(document: &Value, source_name: &str) -> ParsedSource {
    let mut operations = Vec::new();
    let paths = document.get("paths").and_then(Value::as_object);
    for (path, item) in paths.into_iter().flatten() {
        let Some(item) = item.as_object() else {
            continue;
        };
        let shared: Vec<OperationParameter> = item
            .get("parameters")
            .and_then(Value::as_array)
            .map(|list| extract_parameters(list))
            .unwrap_or_default();

        for method in HTTP_METHODS {
            let Some(op) = item.get(method).and_then(Value::as_object) else {
                continue;
            };
            let Some(operation_id) = op.get("operationId").and_then(Value::as_str) else {
                continue;
            };

            let mut parameters = shared.clone();
            if let Some(list) = op.get("parameters").and_then(Value::as_array) {
                parameters.extend(extract_parameters(list));
            }
            if let Some(body) = op.get("requestBody") {
                parameters.push(lift_request_body(body));
            }

            operations.push(Operation {
                operation_id: operation_id.to_string(),
                method: method.to_uppercase(),
                path: path.clone(),
                summary: op.get("summary").and_then(Value::as_str).map(str::to_string),
                description: op
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                parameters,
            });
        }
    }
    ParsedSource {
        source_name: source_name.to_string(),
        operations,
    }
}

fn extract_parameters(values: &[Value]) -> Vec<OperationParameter> {
    values.iter().filter_map(parameter_from_value).collect()
}

fn parameter_from_value(value: &Value) -> Option<OperationParameter> {
    let name = value.get("name").and_then(Value::as_str)?;
    let location = value.get("in").and_then(Value::as_str).unwrap_or("query");
    let schema = value.get("schema").cloned();
    // OpenAPI 3 nests the type under `schema`; Swagger 2 keeps it inline.
    let param_type = schema
        .as_ref()
        .and_then(|schema| schema.get("type"))
        .and_then(Value::as_str)
        .or_else(|| value.get("type").and_then(Value::as_str))
        .map(str::to_string);
    Some(OperationParameter {
        name: name.to_string(),
        location: location.to_string(),
        required: value
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        description: value
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        schema,
        param_type,
    })
}

fn lift_request_body(body: &Value) -> OperationParameter {
    let schema = body
        .get("content")
        .and_then(Value::as_object)
        .and_then(|content| content.values().next())
        .and_then(|media| media.get("schema"))
        .cloned();
    let param_type = schema
        .as_ref()
        .and_then(|schema| schema.get("type"))
        .and_then(Value::as_str)
        .unwrap_or("object")
        .to_string();
    OperationParameter {
        name: "body".to_string(),
        location: "body".to_string(),
        required: body
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        description: body
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string),
        schema,
        param_type: Some(param_type),
    }
}
