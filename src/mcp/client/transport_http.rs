//! HTTP dispatch for the MCP endpoint: one POST per message, answered with
//! either a plain JSON body or a server-sent event stream. Both framings are
//! handled transparently regardless of the configured transport kind.

use super::protocol::{JsonRpcRequest, JsonRpcResponse};
use crate::core::config::data::McpConfig;
use crate::mcp::error::McpError;
use crate::mcp::transport::streamable_http::{is_event_stream_content_type, next_rpc_response};
use crate::mcp::transport::McpTransportKind;
use std::time::Duration;
use tracing::debug;

pub(crate) const MCP_JSON_CONTENT_TYPE: &str = "application/json";
pub(crate) const MCP_JSON_AND_SSE_ACCEPT: &str = "application/json, text/event-stream";
pub(crate) const MCP_PROTOCOL_VERSION_HEADER: &str = "MCP-Protocol-Version";
pub(crate) const MCP_SESSION_ID_HEADER: &str = "mcp-session-id";

const CONNECT_TIMEOUT_MS: u64 = 10_000;

pub(crate) fn require_server_url(config: &McpConfig) -> Result<String, McpError> {
    config
        .server_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .ok_or_else(|| McpError::Config("MCP server URL is not configured.".to_string()))
}

pub(crate) fn build_http_client(config: &McpConfig) -> Result<reqwest::Client, McpError> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(CONNECT_TIMEOUT_MS.min(config.timeout_ms)))
        .timeout(Duration::from_millis(config.timeout_ms))
        .build()
        .map_err(|err| McpError::Connection(format!("Failed to build HTTP client: {err}")))
}

/// What came back from one POST. `response` is `None` for notifications,
/// which expect no reply body.
pub(crate) struct RpcExchange {
    pub response: Option<JsonRpcResponse>,
    pub session_id: Option<String>,
}

pub(crate) async fn post_message(
    http: &reqwest::Client,
    config: &McpConfig,
    session_id: Option<&str>,
    protocol_version: Option<&str>,
    message: &JsonRpcRequest,
) -> Result<RpcExchange, McpError> {
    let url = require_server_url(config)?;
    let payload = serde_json::to_string(message)
        .map_err(|err| McpError::Connection(format!("Failed to encode request: {err}")))?;
    debug!(url = %url, method = %message.method, "Sending MCP request");

    let accept = match config.transport {
        McpTransportKind::Http => MCP_JSON_CONTENT_TYPE,
        McpTransportKind::StreamableHttp => MCP_JSON_AND_SSE_ACCEPT,
    };
    let mut request = http
        .post(url)
        .header("Content-Type", MCP_JSON_CONTENT_TYPE)
        .header("Accept", accept)
        .body(payload);

    if let Some(token) = config
        .auth_token
        .as_deref()
        .map(str::trim)
        .filter(|token| !token.is_empty())
    {
        request = request.header("Authorization", format!("Bearer {token}"));
    }
    if let Some(version) = protocol_version {
        request = request.header(MCP_PROTOCOL_VERSION_HEADER, version);
    }
    if let Some(session_id) = session_id {
        request = request.header(MCP_SESSION_ID_HEADER, session_id);
    }

    let response = request.send().await.map_err(map_send_error)?;
    if !response.status().is_success() {
        return Err(McpError::Connection(format!(
            "HTTP error: {}",
            response.status()
        )));
    }

    let session_id = response
        .headers()
        .get(MCP_SESSION_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    if message.id.is_none() {
        return Ok(RpcExchange {
            response: None,
            session_id,
        });
    }

    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    let frame = if is_event_stream_content_type(&content_type) {
        next_rpc_response(response).await?
    } else {
        let body = response
            .bytes()
            .await
            .map_err(|err| McpError::Connection(format!("Failed to read response: {err}")))?;
        serde_json::from_slice::<JsonRpcResponse>(&body)
            .map_err(|err| McpError::Connection(format!("Malformed response body: {err}")))?
    };

    Ok(RpcExchange {
        response: Some(frame),
        session_id,
    })
}

fn map_send_error(err: reqwest::Error) -> McpError {
    if err.is_timeout() {
        McpError::Connection(format!("Request timed out: {err}"))
    } else {
        McpError::Connection(format!("Request failed: {err}"))
    }
}
