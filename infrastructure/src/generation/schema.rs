//! Tool schema rendering.
//!
//! Converts catalog [`ToolDescriptor`]s into provider-neutral JSON Schema
//! for native tool-use APIs.
//!
//! Handles param_type → JSON Schema type mapping:
//! - `"string"` → `"string"`
//! - `"number"` → `"number"`
//! - `"integer"` → `"integer"`
//! - `"boolean"` → `"boolean"`
//! - `"object"` → `"object"`
//! - anything else → `"string"`

use toolgate_domain::tool::entities::ToolDescriptor;

/// Render one tool descriptor as provider-neutral JSON Schema.
pub fn render_tool_schema(tool: &ToolDescriptor) -> serde_json::Value {
    let mut properties = serde_json::Map::new();
    let mut required = Vec::new();

    for param in &tool.parameters {
        let schema_type = match param.param_type.as_str() {
            "string" => "string",
            "number" => "number",
            "integer" => "integer",
            "boolean" => "boolean",
            "object" => "object",
            _ => "string",
        };

        let mut prop = serde_json::Map::new();
        prop.insert("type".to_string(), serde_json::json!(schema_type));
        prop.insert(
            "description".to_string(),
            serde_json::json!(param.description),
        );
        properties.insert(param.name.clone(), serde_json::Value::Object(prop));

        if param.required {
            required.push(serde_json::json!(param.name));
        }
    }

    serde_json::json!({
        "name": tool.name,
        "description": tool.description,
        "input_schema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Render a set of descriptors, sorted by name for stable output.
pub fn render_tools_schema(tools: &[ToolDescriptor]) -> Vec<serde_json::Value> {
    let mut tools: Vec<&ToolDescriptor> = tools.iter().collect();
    tools.sort_by_key(|t| &t.name);
    tools.into_iter().map(render_tool_schema).collect()
}
