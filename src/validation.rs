//! Declarative configuration validation.
//!
//! Checks a JSON config document against a [`Schema`] and enforces the
//! credential-specific rule that exactly one cloud binding is populated.
//! Validation runs before any remote call so bad configuration never
//! produces partial state changes.

use serde_json::Value;

use crate::schema::{Attribute, AttributeType, Block, Diagnostic, Schema};

/// The mutually exclusive cloud-binding blocks. Exactly one must appear in
/// a valid credential configuration.
pub const CLOUD_BINDING_FIELDS: &[&str] = &[
    "aws_iam_role",
    "azure_service_principal",
    "azure_managed_identity",
    "gcp_service_account_key",
    "databricks_gcp_service_account",
    "cloudflare_api_token",
];

/// Validate a config document against a schema. An empty result means the
/// document is valid.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    validate_block(&schema.block, value, "", &mut diagnostics);
    diagnostics
}

/// Enforce the exactly-one-of rule over the cloud-binding blocks.
pub fn validate_cloud_binding(value: &Value) -> Vec<Diagnostic> {
    let obj = match value.as_object() {
        Some(obj) => obj,
        None => return Vec::new(),
    };

    let populated: Vec<&str> = CLOUD_BINDING_FIELDS
        .iter()
        .copied()
        .filter(|f| matches!(obj.get(*f), Some(v) if !v.is_null()))
        .collect();

    match populated.len() {
        1 => Vec::new(),
        0 => vec![Diagnostic::error(format!(
            "exactly one of {} must be specified",
            CLOUD_BINDING_FIELDS.join(", ")
        ))],
        _ => vec![Diagnostic::error(format!(
            "only one cloud binding may be specified, got {}",
            populated.join(", ")
        ))],
    }
}

fn validate_block(block: &Block, value: &Value, path: &str, diagnostics: &mut Vec<Diagnostic>) {
    let obj = match value {
        Value::Object(map) => map,
        Value::Null => return,
        other => {
            diagnostics.push(
                Diagnostic::error(format!("expected object, got {}", type_name(other)))
                    .with_attribute(path),
            );
            return;
        }
    };

    for (name, attr) in &block.attributes {
        let attr_path = join_path(path, name);
        validate_attribute(attr, obj.get(name), &attr_path, diagnostics);
    }

    for (name, nested) in &block.blocks {
        let block_path = join_path(path, name);
        if let Some(v) = obj.get(name) {
            validate_block(nested, v, &block_path, diagnostics);
        }
    }
}

fn validate_attribute(
    attr: &Attribute,
    value: Option<&Value>,
    path: &str,
    diagnostics: &mut Vec<Diagnostic>,
) {
    // Computed-only attributes are set by the remote side, never validated.
    if attr.flags.computed && !attr.flags.required && !attr.flags.optional {
        return;
    }

    match value {
        None | Some(Value::Null) => {
            if attr.flags.required {
                diagnostics.push(
                    Diagnostic::error(format!("missing required attribute '{}'", path))
                        .with_attribute(path),
                );
            }
        }
        Some(v) => {
            let ok = match attr.attr_type {
                AttributeType::String => v.is_string(),
                AttributeType::Bool => v.is_boolean(),
                AttributeType::Int64 => v.as_i64().is_some(),
            };
            if !ok {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "invalid type for attribute '{}': expected {:?}, got {}",
                        path,
                        attr.attr_type,
                        type_name(v)
                    ))
                    .with_attribute(path),
                );
            }
        }
    }
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
