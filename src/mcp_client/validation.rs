//! Argument validation against a tool's declared JSON Schema.
//!
//! Runs before any request reaches a tool server. Validation follows the
//! schema's declared draft (2020-12 when none is given), including `$ref`,
//! `pattern` and `format`. The first violation found is reported, prefixed
//! with the JSON pointer of the offending value.

use serde_json::Value;

use super::types::ToolDescriptor;

/// Validate `args` against the tool's `args_schema`.
///
/// Returns `None` when the arguments conform, or a human-readable violation.
/// A schema that does not compile is reported as a violation too, so a
/// broken tool is never called.
pub fn validate_args(tool: &ToolDescriptor, args: &Value) -> Option<String> {
    validate_value(&tool.args_schema, args)
}

/// Validate `instance` against `schema`, reporting the first violation.
pub fn validate_value(schema: &Value, instance: &Value) -> Option<String> {
    let validator = match jsonschema::options()
        .should_validate_formats(true)
        .build(schema)
    {
        Ok(validator) => validator,
        Err(e) => return Some(format!("invalid argument schema: {e}")),
    };

    let error = validator.iter_errors(instance).next()?;
    let path = error.instance_path.to_string();
    if path.is_empty() {
        Some(error.to_string())
    } else {
        Some(format!("{path}: {error}"))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
