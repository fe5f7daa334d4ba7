use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool definition in the assistant's function-calling format, as sent in
/// the `tools` array of a chat completion request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ChatToolFunction,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatToolFunction {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON-Schema object describing the tool's parameters.
    pub parameters: Value,
}

impl ChatToolDefinition {
    pub fn function(name: String, description: Option<String>, parameters: Value) -> Self {
        Self {
            kind: "function".to_string(),
            function: ChatToolFunction {
                name,
                description,
                parameters,
            },
        }
    }
}

/// A tool call emitted by the assistant. The `arguments` field arrives as a
/// JSON-encoded string, per the chat completion wire format.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: ChatToolCallFunction,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatToolCallFunction {
    pub name: String,
    pub arguments: String,
}
