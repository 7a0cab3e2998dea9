//! Pure argument validation against a tool descriptor
//!
//! Runs before dispatch so that malformed calls never reach a provider.
//! No I/O; returns a human-readable message on the first violation found.

use serde_json::Value;

use super::entities::{ToolCall, ToolDescriptor};

/// Validate a tool call's arguments against the descriptor's parameters.
///
/// Checks, in order:
/// 1. every required parameter is present
/// 2. no unknown argument keys
/// 3. each argument's JSON type matches the declared `param_type`
pub fn validate_arguments(call: &ToolCall, descriptor: &ToolDescriptor) -> Result<(), String> {
    for param in &descriptor.parameters {
        if param.required && !call.arguments.contains_key(&param.name) {
            return Err(format!(
                "Missing required parameter '{}' for tool '{}'",
                param.name, descriptor.name
            ));
        }
    }

    for (arg_name, value) in &call.arguments {
        let Some(param) = descriptor.parameter(arg_name) else {
            return Err(format!(
                "Unknown parameter '{}' for tool '{}'",
                arg_name, descriptor.name
            ));
        };

        if !type_matches(&param.param_type, value) {
            return Err(format!(
                "Parameter '{}' of tool '{}' expects {}, got {}",
                arg_name,
                descriptor.name,
                param.param_type,
                json_type_name(value)
            ));
        }
    }

    Ok(())
}

fn type_matches(param_type: &str, value: &Value) -> bool {
    match param_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        // Unrecognized declared types accept anything
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
