//! Transport selection for the MCP endpoint.
//!
//! Both kinds POST JSON-RPC to one HTTP endpoint; they differ in what the
//! server is expected to answer with. Response framing is normalized in
//! [`streamable_http`] so higher-level code never sees the difference.

use serde::{Deserialize, Serialize};

pub mod streamable_http;

/// Supported framing styles for the MCP HTTP endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum McpTransportKind {
    /// Plain request/response JSON bodies.
    Http,
    /// The server may answer with a server-sent event stream.
    #[default]
    StreamableHttp,
}

impl McpTransportKind {
    /// Resolves the transport kind from a host setting value.
    pub fn from_setting(value: &str) -> Result<Self, String> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" | "json" => Ok(McpTransportKind::Http),
            "streamable-http" | "streamable_http" | "sse" => Ok(McpTransportKind::StreamableHttp),
            other => Err(format!("Unsupported MCP transport: {other}")),
        }
    }
}
