//! Protocol client: one logical session with a remote MCP server.
//!
//! A session is connect → operate → disconnect; the orchestrator never
//! reuses a session across discovery and invocation lifecycles. Session
//! state is mutated in place, so concurrent callers must not share one
//! client instance.

use crate::core::config::data::McpConfig;
use crate::mcp::error::McpError;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

pub mod protocol;
mod transport_http;

pub use protocol::{CallOutcome, ServerInfo, ToolDescriptor};

use protocol::{methods, JsonRpcRequest};

/// The session contract the orchestrator drives. Extracted as a trait so
/// orchestration logic can be exercised against test doubles.
#[async_trait]
pub trait ToolSession {
    async fn connect(&mut self) -> Result<(), McpError>;
    async fn disconnect(&mut self);
    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, McpError>;
    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<CallOutcome, McpError>;
}

pub struct McpClient {
    config: McpConfig,
    http: Option<reqwest::Client>,
    session_id: Option<String>,
    protocol_version: Option<String>,
    server_info: Option<ServerInfo>,
    request_id: u64,
    ready: bool,
}

impl McpClient {
    pub fn new(config: McpConfig) -> Self {
        Self {
            config,
            http: None,
            session_id: None,
            protocol_version: None,
            server_info: None,
            request_id: 0,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn server_info(&self) -> Option<&ServerInfo> {
        self.server_info.as_ref()
    }

    /// Connect, capture the server's self-reported identity, disconnect.
    pub async fn test_connection(&mut self) -> Result<ServerInfo, McpError> {
        self.connect().await?;
        let verdict = self
            .server_info
            .clone()
            .ok_or_else(|| McpError::Connection("Server did not identify itself.".to_string()));
        self.disconnect().await;
        verdict
    }

    fn next_request_id(&mut self) -> u64 {
        let id = self.request_id;
        self.request_id = self.request_id.saturating_add(1);
        id
    }

    async fn send_request(&mut self, method: &str, params: Value) -> Result<Value, McpError> {
        let http = self.http.clone().ok_or(McpError::NotConnected)?;
        let message = JsonRpcRequest::call(self.next_request_id(), method, params);
        let exchange = transport_http::post_message(
            &http,
            &self.config,
            self.session_id.as_deref(),
            self.protocol_version.as_deref(),
            &message,
        )
        .await?;
        if let Some(session_id) = exchange.session_id {
            self.session_id = Some(session_id);
        }
        let frame = exchange
            .response
            .ok_or_else(|| McpError::Connection("Missing response body.".to_string()))?;
        protocol::response_result(frame)
    }

    async fn send_notification(&mut self, method: &str) -> Result<(), McpError> {
        let http = self.http.clone().ok_or(McpError::NotConnected)?;
        let message = JsonRpcRequest::notification(method);
        let exchange = transport_http::post_message(
            &http,
            &self.config,
            self.session_id.as_deref(),
            self.protocol_version.as_deref(),
            &message,
        )
        .await?;
        if let Some(session_id) = exchange.session_id {
            self.session_id = Some(session_id);
        }
        Ok(())
    }

    /// Capability negotiation and client identity exchange. A JSON-RPC error
    /// here is a failed handshake, not a tool-execution failure.
    async fn handshake(&mut self) -> Result<(), McpError> {
        let result = self
            .send_request(methods::INITIALIZE, protocol::initialize_params())
            .await
            .map_err(|err| match err {
                McpError::Server(message) => {
                    McpError::Connection(format!("Handshake rejected: {message}"))
                }
                other => other,
            })?;
        let initialize = protocol::parse_initialize_result(result)?;
        debug!(
            server = %initialize.server_info.name,
            version = %initialize.server_info.version,
            protocol = %initialize.protocol_version,
            "MCP handshake complete"
        );
        self.protocol_version = Some(initialize.protocol_version);
        self.server_info = Some(initialize.server_info);
        self.send_notification(methods::INITIALIZED).await
    }

    fn teardown(&mut self) {
        self.ready = false;
        self.http = None;
        self.session_id = None;
        self.protocol_version = None;
        self.server_info = None;
        self.request_id = 0;
    }
}

#[async_trait]
impl ToolSession for McpClient {
    async fn connect(&mut self) -> Result<(), McpError> {
        if self.ready {
            return Ok(());
        }
        // Missing endpoint is a configuration problem, reported before any
        // network activity.
        transport_http::require_server_url(&self.config)?;
        self.http = Some(transport_http::build_http_client(&self.config)?);
        match self.handshake().await {
            Ok(()) => {
                self.ready = true;
                Ok(())
            }
            Err(err) => {
                self.teardown();
                Err(err)
            }
        }
    }

    /// Idempotent; safe on an already-closed session. Releasing local
    /// resources cannot fail, so nothing here can mask an earlier error.
    async fn disconnect(&mut self) {
        if self.ready {
            debug!("Closing MCP session");
        }
        self.teardown();
    }

    async fn list_tools(&mut self) -> Result<Vec<ToolDescriptor>, McpError> {
        if !self.ready {
            return Err(McpError::NotConnected);
        }
        let result = self.send_request(methods::TOOLS_LIST, json!({})).await?;
        Ok(protocol::parse_tool_listing(result))
    }

    async fn call_tool(&mut self, name: &str, arguments: Value) -> Result<CallOutcome, McpError> {
        if !self.ready {
            return Err(McpError::NotConnected);
        }
        let params = json!({"name": name, "arguments": arguments});
        let result = self.send_request(methods::TOOLS_CALL, params).await?;
        protocol::parse_call_result(result)
    }
}
