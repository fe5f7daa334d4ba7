//! Error taxonomy for the MCP integration layer.
//!
//! Every outward-facing error string is prefixed with a stable category tag
//! so the host UI can branch on category without matching free text.

use std::fmt;

pub const TAG_CONFIG: &str = "MCP_CONFIG_ERROR";
pub const TAG_CONNECTION: &str = "MCP_CONNECTION_ERROR";
pub const TAG_NOT_CONNECTED: &str = "MCP_NOT_CONNECTED";
pub const TAG_SERVER: &str = "MCP_SERVER_ERROR";
pub const TAG_TOOL_NOT_ALLOWED: &str = "MCP_TOOL_NOT_ALLOWED";
pub const TAG_INVALID_ARGUMENT: &str = "MCP_INVALID_ARGUMENT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpError {
    /// Caller misconfiguration, e.g. a missing server endpoint.
    Config(String),
    /// Handshake, transport, or timeout failure.
    Connection(String),
    /// An operation was attempted on a session that is not ready.
    NotConnected,
    /// The remote server reported a JSON-RPC or tool-execution error.
    Server(String),
}

impl McpError {
    pub fn tag(&self) -> &'static str {
        match self {
            McpError::Config(_) => TAG_CONFIG,
            McpError::Connection(_) => TAG_CONNECTION,
            McpError::NotConnected => TAG_NOT_CONNECTED,
            McpError::Server(_) => TAG_SERVER,
        }
    }

    /// Human-readable message without the category tag.
    pub fn message(&self) -> String {
        match self {
            McpError::Config(message)
            | McpError::Connection(message)
            | McpError::Server(message) => message.clone(),
            McpError::NotConnected => "MCP session is not connected.".to_string(),
        }
    }
}

impl fmt::Display for McpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.tag(), self.message())
    }
}

impl std::error::Error for McpError {}

/// Closed enumeration of the JSON-RPC error codes servers may report.
/// Anything outside the fixed range maps to [`RpcErrorKind::ServerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcErrorKind {
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ServerError,
}

impl RpcErrorKind {
    pub fn from_code(code: i64) -> Self {
        match code {
            -32700 => RpcErrorKind::ParseError,
            -32600 => RpcErrorKind::InvalidRequest,
            -32601 => RpcErrorKind::MethodNotFound,
            -32602 => RpcErrorKind::InvalidParams,
            -32603 => RpcErrorKind::InternalError,
            _ => RpcErrorKind::ServerError,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RpcErrorKind::ParseError => "parse error",
            RpcErrorKind::InvalidRequest => "invalid request",
            RpcErrorKind::MethodNotFound => "method not found",
            RpcErrorKind::InvalidParams => "invalid params",
            RpcErrorKind::InternalError => "internal error",
            RpcErrorKind::ServerError => "server error",
        }
    }
}
