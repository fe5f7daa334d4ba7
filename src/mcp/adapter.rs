//! Translation from MCP tool descriptors to the assistant's function-calling
//! format. Pure and total: a descriptor that fails validation yields a
//! clearly marked placeholder entry instead of failing the batch, so
//! downstream consumers can detect and optionally filter it.

use crate::api::ChatToolDefinition;
use crate::mcp::client::ToolDescriptor;
use serde_json::{json, Map, Value};

/// Namespace prefix that keeps remote tools from colliding with host-native
/// ones. Applied to every adapted name without exception.
pub const MCP_TOOL_PREFIX: &str = "mcp_";

/// Provenance marker prepended to every adapted description.
pub const MCP_DESCRIPTION_TAG: &str = "[MCP]";

pub fn adapt_tool(index: usize, descriptor: &ToolDescriptor) -> ChatToolDefinition {
    let Some(name) = descriptor
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        return placeholder(index, "descriptor has no usable name");
    };

    ChatToolDefinition::function(
        format!("{MCP_TOOL_PREFIX}{name}"),
        Some(adapt_description(name, descriptor.description.as_ref())),
        translate_input_schema(descriptor.input_schema.as_ref()),
    )
}

/// Strips the namespace prefix to recover the remote tool name.
pub fn strip_tool_prefix(name: &str) -> &str {
    name.strip_prefix(MCP_TOOL_PREFIX).unwrap_or(name)
}

fn placeholder(index: usize, failure: &str) -> ChatToolDefinition {
    ChatToolDefinition::function(
        format!("{MCP_TOOL_PREFIX}invalid_tool_{index}"),
        Some(format!(
            "{MCP_DESCRIPTION_TAG} Invalid tool at position {index}: {failure}."
        )),
        empty_object_schema(),
    )
}

fn adapt_description(name: &str, description: Option<&Value>) -> String {
    match description
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|text| !text.is_empty())
    {
        Some(text) => format!("{MCP_DESCRIPTION_TAG} {text}"),
        None => format!("{MCP_DESCRIPTION_TAG} No description available for '{name}'."),
    }
}

fn empty_object_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Maps the advertised input schema to a JSON-Schema parameters object.
/// Anything that is not a well-formed object schema degrades to an empty
/// one rather than failing.
pub fn translate_input_schema(schema: Option<&Value>) -> Value {
    let Some(fields) = schema.and_then(Value::as_object) else {
        return empty_object_schema();
    };

    let mut out = Map::new();
    out.insert("type".to_string(), json!("object"));

    let mut properties = Map::new();
    if let Some(declared) = fields.get("properties").and_then(Value::as_object) {
        for (key, property) in declared {
            properties.insert(key.clone(), translate_property(property));
        }
    }
    out.insert("properties".to_string(), Value::Object(properties));

    if let Some(required) = fields.get("required").and_then(Value::as_array) {
        let names: Vec<Value> = required
            .iter()
            .filter(|name| name.is_string())
            .cloned()
            .collect();
        if !names.is_empty() {
            out.insert("required".to_string(), Value::Array(names));
        }
    }

    Value::Object(out)
}

fn translate_property(property: &Value) -> Value {
    let Some(fields) = property.as_object() else {
        return json!({"type": "string"});
    };

    let kind = translate_type(fields.get("type").and_then(Value::as_str));
    let mut out = Map::new();
    out.insert("type".to_string(), json!(kind));

    for key in [
        "description",
        "default",
        "enum",
        "minimum",
        "maximum",
        "minLength",
        "maxLength",
    ] {
        if let Some(value) = fields.get(key) {
            out.insert(key.to_string(), value.clone());
        }
    }

    match kind {
        "array" => {
            if let Some(items) = fields.get("items") {
                out.insert("items".to_string(), translate_property(items));
            }
        }
        "object" => {
            let nested = translate_input_schema(Some(property));
            if let Some(nested_fields) = nested.as_object() {
                if let Some(nested_properties) = nested_fields.get("properties") {
                    out.insert("properties".to_string(), nested_properties.clone());
                }
                if let Some(nested_required) = nested_fields.get("required") {
                    out.insert("required".to_string(), nested_required.clone());
                }
            }
        }
        _ => {}
    }

    Value::Object(out)
}

/// Integers collapse into numbers; anything unrecognized defaults to string.
fn translate_type(kind: Option<&str>) -> &'static str {
    match kind {
        Some("string") => "string",
        Some("number") | Some("integer") => "number",
        Some("boolean") => "boolean",
        Some("array") => "array",
        Some("object") => "object",
        _ => "string",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(name: Option<&str>, description: Option<Value>, schema: Option<Value>) -> ToolDescriptor {
        ToolDescriptor {
            name: name.map(str::to_string),
            description,
            input_schema: schema,
        }
    }

    #[test]
    fn adapted_name_carries_the_namespace_prefix() {
        let adapted = adapt_tool(0, &descriptor(Some("search"), None, None));
        assert_eq!(adapted.function.name, "mcp_search");
        assert_eq!(strip_tool_prefix(&adapted.function.name), "search");
    }

    #[test]
    fn strip_is_a_no_op_without_the_prefix() {
        assert_eq!(strip_tool_prefix("search"), "search");
    }

    #[test]
    fn description_is_tagged_with_provenance() {
        let adapted = adapt_tool(
            0,
            &descriptor(Some("search"), Some(json!("Find notes by query")), None),
        );
        assert_eq!(
            adapted.function.description.as_deref(),
            Some("[MCP] Find notes by query")
        );
    }

    #[test]
    fn missing_or_non_string_description_names_the_tool() {
        for description in [None, Some(json!(42)), Some(json!({"text": "nested"}))] {
            let adapted = adapt_tool(0, &descriptor(Some("search"), description, None));
            assert_eq!(
                adapted.function.description.as_deref(),
                Some("[MCP] No description available for 'search'.")
            );
        }
    }

    #[test]
    fn nameless_descriptor_yields_a_marked_placeholder() {
        for name in [None, Some(""), Some("   ")] {
            let adapted = adapt_tool(3, &descriptor(name, None, None));
            assert_eq!(adapted.function.name, "mcp_invalid_tool_3");
            let description = adapted.function.description.expect("description");
            assert!(description.contains("Invalid tool at position 3"));
        }
    }

    #[test]
    fn schema_round_trip_preserves_constraints() {
        let schema = json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query",
                    "minLength": 1,
                    "maxLength": 256
                },
                "limit": {
                    "type": "integer",
                    "default": 10,
                    "minimum": 1,
                    "maximum": 100
                },
                "mode": {
                    "type": "string",
                    "enum": ["exact", "fuzzy"]
                }
            },
            "required": ["query"]
        });

        let adapted = adapt_tool(0, &descriptor(Some("search"), None, Some(schema)));
        let parameters = &adapted.function.parameters;

        assert_eq!(parameters["type"], "object");
        assert_eq!(parameters["required"], json!(["query"]));
        assert_eq!(parameters["properties"]["query"]["description"], "Search query");
        assert_eq!(parameters["properties"]["query"]["minLength"], 1);
        assert_eq!(parameters["properties"]["query"]["maxLength"], 256);
        // Integer collapses into number; bounds and default survive.
        assert_eq!(parameters["properties"]["limit"]["type"], "number");
        assert_eq!(parameters["properties"]["limit"]["default"], 10);
        assert_eq!(parameters["properties"]["limit"]["minimum"], 1);
        assert_eq!(parameters["properties"]["limit"]["maximum"], 100);
        assert_eq!(
            parameters["properties"]["mode"]["enum"],
            json!(["exact", "fuzzy"])
        );
    }

    #[test]
    fn unrecognized_types_default_to_string() {
        let schema = json!({
            "type": "object",
            "properties": {
                "weird": {"type": "quaternion"},
                "untyped": {},
                "not_even_an_object": 7
            }
        });

        let adapted = adapt_tool(0, &descriptor(Some("x"), None, Some(schema)));
        let properties = &adapted.function.parameters["properties"];
        assert_eq!(properties["weird"]["type"], "string");
        assert_eq!(properties["untyped"]["type"], "string");
        assert_eq!(properties["not_even_an_object"]["type"], "string");
    }

    #[test]
    fn arrays_and_objects_translate_recursively() {
        let schema = json!({
            "type": "object",
            "properties": {
                "tags": {
                    "type": "array",
                    "items": {"type": "string", "minLength": 1}
                },
                "filter": {
                    "type": "object",
                    "properties": {
                        "folder": {"type": "string"},
                        "depth": {"type": "integer"}
                    },
                    "required": ["folder"]
                }
            }
        });

        let adapted = adapt_tool(0, &descriptor(Some("x"), None, Some(schema)));
        let properties = &adapted.function.parameters["properties"];
        assert_eq!(properties["tags"]["items"]["type"], "string");
        assert_eq!(properties["tags"]["items"]["minLength"], 1);
        assert_eq!(
            properties["filter"]["properties"]["folder"]["type"],
            "string"
        );
        assert_eq!(properties["filter"]["properties"]["depth"]["type"], "number");
        assert_eq!(properties["filter"]["required"], json!(["folder"]));
    }

    #[test]
    fn degenerate_schemas_become_empty_object_schemas() {
        for schema in [None, Some(json!("not-an-object")), Some(json!([1, 2]))] {
            let adapted = adapt_tool(0, &descriptor(Some("x"), None, schema));
            assert_eq!(
                adapted.function.parameters,
                json!({"type": "object", "properties": {}})
            );
        }
    }

    #[test]
    fn empty_required_list_is_dropped() {
        let schema = json!({"type": "object", "properties": {}, "required": []});
        let adapted = adapt_tool(0, &descriptor(Some("x"), None, Some(schema)));
        assert!(adapted.function.parameters.get("required").is_none());
    }
}
