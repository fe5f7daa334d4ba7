//! JSON-RPC envelope and MCP payload types for the wire protocol.
//!
//! Parsing is deliberately permissive: the tool listing is folded per entry
//! so one malformed descriptor can never poison the batch, and unknown
//! fields are ignored everywhere.

use crate::mcp::error::{McpError, RpcErrorKind};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

pub const JSONRPC_VERSION: &str = "2.0";
pub const PROTOCOL_VERSION: &str = "2025-06-18";

pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
}

#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn call(id: u64, method: &str, params: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: Some(id),
            method: method.to_string(),
            params: Some(params),
        }
    }

    pub fn notification(method: &str) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: None,
            method: method.to_string(),
            params: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn kind(&self) -> RpcErrorKind {
        RpcErrorKind::from_code(self.code)
    }
}

pub fn format_rpc_error(error: &RpcError) -> String {
    let mut output = format!(
        "{} ({}): {}",
        error.kind().label(),
        error.code,
        error.message
    );
    if let Some(data) = &error.data {
        let details = data
            .get("details")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| data.as_str().map(str::to_string))
            .or_else(|| serde_json::to_string(data).ok());
        if let Some(details) = details.filter(|details| !details.is_empty()) {
            output.push_str(" - ");
            output.push_str(&details);
        }
    }
    output
}

/// Unwraps a JSON-RPC envelope into its result payload.
pub fn response_result(response: JsonRpcResponse) -> Result<Value, McpError> {
    if let Some(error) = response.error {
        return Err(McpError::Server(format_rpc_error(&error)));
    }
    response.result.ok_or_else(|| {
        McpError::Server("Response carried neither result nor error.".to_string())
    })
}

/// The remote server's self-reported identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    #[serde(default)]
    pub capabilities: Value,
    #[serde(rename = "serverInfo")]
    pub server_info: ServerInfo,
}

pub fn initialize_params() -> Value {
    serde_json::json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {},
        "clientInfo": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

pub fn parse_initialize_result(result: Value) -> Result<InitializeResult, McpError> {
    let parsed: InitializeResult = serde_json::from_value(result)
        .map_err(|err| McpError::Connection(format!("Malformed initialize response: {err}")))?;
    if parsed.protocol_version.trim().is_empty() {
        return Err(McpError::Connection(
            "Initialize response is missing a protocol version.".to_string(),
        ));
    }
    Ok(parsed)
}

/// One advertised tool. Everything beyond the name is optional so a sloppy
/// server cannot poison the listing; a missing name is handled downstream by
/// the schema adapter's placeholder path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Value>,
    #[serde(default, rename = "inputSchema")]
    pub input_schema: Option<Value>,
}

/// Folds the `tools/list` result per entry, keeping the entries that parse.
/// Never fails because of individual malformed entries.
pub fn parse_tool_listing(result: Value) -> Vec<ToolDescriptor> {
    let Some(entries) = result.get("tools").and_then(Value::as_array) else {
        warn!("tools/list result carried no tools array");
        return Vec::new();
    };

    let mut descriptors = Vec::with_capacity(entries.len());
    let mut skipped = 0_usize;
    for (index, entry) in entries.iter().enumerate() {
        match serde_json::from_value::<ToolDescriptor>(entry.clone()) {
            Ok(descriptor) => descriptors.push(descriptor),
            Err(err) => {
                skipped += 1;
                warn!(index, %err, "Skipping malformed tool entry");
            }
        }
    }
    if skipped > 0 {
        debug!(
            kept = descriptors.len(),
            skipped, "Tool listing parsed with skipped entries"
        );
    }
    descriptors
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<Value>,
    #[serde(default, rename = "structuredContent")]
    pub structured_content: Option<Value>,
    #[serde(default, rename = "isError")]
    pub is_error: bool,
}

/// Normalized outcome of one tool invocation. When `is_error` is set, `text`
/// carries the concatenated text content of the error payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CallOutcome {
    pub is_error: bool,
    pub text: String,
    pub structured: Option<Value>,
}

pub fn parse_call_result(result: Value) -> Result<CallOutcome, McpError> {
    let parsed: CallToolResult = serde_json::from_value(result)
        .map_err(|err| McpError::Server(format!("Malformed tools/call response: {err}")))?;
    Ok(CallOutcome {
        is_error: parsed.is_error,
        text: concatenated_text(&parsed.content),
        structured: parsed.structured_content,
    })
}

/// Joins the text items of a content array, newline separated. Non-text
/// items are skipped.
pub fn concatenated_text(content: &[Value]) -> String {
    content
        .iter()
        .filter_map(|item| item.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}
