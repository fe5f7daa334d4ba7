//! Composes the policy engine, tool cache, schema adapter, and protocol
//! client into the two operations the host needs: list the remote tools in
//! the assistant's format, and invoke one by name.
//!
//! Components are explicitly constructed and owned here rather than being
//! globals, so hosts can instantiate one orchestrator per session and tests
//! can substitute session doubles.

use crate::api::ChatToolDefinition;
use crate::core::config::data::McpConfig;
use crate::mcp::adapter::{adapt_tool, strip_tool_prefix};
use crate::mcp::cache::ToolCache;
use crate::mcp::client::{McpClient, ServerInfo, ToolDescriptor, ToolSession};
use crate::mcp::error::{
    McpError, TAG_CONFIG, TAG_CONNECTION, TAG_INVALID_ARGUMENT, TAG_SERVER, TAG_TOOL_NOT_ALLOWED,
};
use crate::mcp::policy::PolicyEngine;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of one tool invocation, ready for a chat transcript. On failure
/// the error string is prefixed with its stable category tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub success: bool,
    pub result: Option<String>,
    pub structured: Option<Value>,
    pub error: Option<String>,
}

impl ToolInvocation {
    pub(crate) fn failure(tag: &str, message: &str) -> Self {
        Self {
            success: false,
            result: None,
            structured: None,
            error: Some(format!("{tag}: {message}")),
        }
    }
}

/// Verdict of a connection test: the remote server's self-reported identity
/// on success, a tagged reason on failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionTest {
    pub success: bool,
    pub server_info: Option<ServerInfo>,
    pub error: Option<String>,
}

pub struct ToolOrchestrator {
    policy: PolicyEngine,
    cache: ToolCache,
    startup_refresh_done: bool,
}

impl Default for ToolOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolOrchestrator {
    pub fn new() -> Self {
        Self {
            policy: PolicyEngine::default(),
            cache: ToolCache::new(),
            startup_refresh_done: false,
        }
    }

    /// Returns the remote tools in the assistant's format. Tool loading must
    /// never block chat usage: every failure on this path is logged and
    /// degrades to an empty list.
    pub async fn get_mcp_tools(&mut self, config: &McpConfig) -> Vec<ChatToolDefinition> {
        if !config.enabled {
            return Vec::new();
        }
        let mut session = McpClient::new(config.clone());
        self.get_tools_with_session(&mut session, config).await
    }

    pub(crate) async fn get_tools_with_session<S: ToolSession + Send>(
        &mut self,
        session: &mut S,
        config: &McpConfig,
    ) -> Vec<ChatToolDefinition> {
        if !config.enabled {
            return Vec::new();
        }
        if config.refresh_on_start && !self.startup_refresh_done {
            self.cache.invalidate();
        }
        self.startup_refresh_done = true;

        if let Some(descriptors) = self.cache.get_tools() {
            debug!(count = descriptors.len(), "Serving MCP tools from cache");
            return adapt_all(&descriptors);
        }

        match self.discover(session).await {
            Ok(descriptors) => adapt_all(&descriptors),
            Err(err) => {
                warn!(error = %err, "MCP tool discovery failed; continuing with no remote tools");
                Vec::new()
            }
        }
    }

    /// One connect-list-disconnect cycle; the raw descriptor list is cached
    /// before adaptation so cache hits re-adapt deterministically.
    async fn discover<S: ToolSession + Send>(
        &mut self,
        session: &mut S,
    ) -> Result<Vec<ToolDescriptor>, McpError> {
        session.connect().await?;
        let listed = session.list_tools().await;
        session.disconnect().await;
        let descriptors = listed?;
        debug!(count = descriptors.len(), "Discovered MCP tools");
        self.cache.set_tools(descriptors.clone(), None);
        Ok(descriptors)
    }

    /// Invokes a named tool with an opaque argument tree. The name arrives
    /// prefixed; policy checks run against the unprefixed remote name.
    pub async fn invoke_mcp_tool(
        &mut self,
        name: &str,
        arguments: Value,
        config: &McpConfig,
    ) -> ToolInvocation {
        let mut session = McpClient::new(config.clone());
        self.invoke_with_session(&mut session, name, arguments, config)
            .await
    }

    pub(crate) async fn invoke_with_session<S: ToolSession + Send>(
        &mut self,
        session: &mut S,
        name: &str,
        arguments: Value,
        config: &McpConfig,
    ) -> ToolInvocation {
        self.policy.reconfigure(config.clone());
        let tool_name = strip_tool_prefix(name);

        let access = self.policy.check_tool_access(tool_name);
        if !access.allowed {
            return ToolInvocation::failure(
                TAG_TOOL_NOT_ALLOWED,
                &access.reason.unwrap_or_default(),
            );
        }
        let size = self.policy.check_argument_size(&arguments);
        if !size.allowed {
            return ToolInvocation::failure(TAG_INVALID_ARGUMENT, &size.reason.unwrap_or_default());
        }

        if let Err(err) = session.connect().await {
            return ToolInvocation::failure(TAG_CONNECTION, &err.message());
        }
        let outcome = session.call_tool(tool_name, arguments).await;
        // The session is closed on every path, the error path included.
        session.disconnect().await;

        match outcome {
            Ok(outcome) if outcome.is_error => ToolInvocation::failure(TAG_SERVER, &outcome.text),
            Ok(outcome) => ToolInvocation {
                success: true,
                result: Some(outcome.text),
                structured: outcome.structured,
                error: None,
            },
            Err(McpError::Server(message)) => ToolInvocation::failure(TAG_SERVER, &message),
            Err(err) => ToolInvocation::failure(TAG_CONNECTION, &err.message()),
        }
    }

    /// Drops the cached listing; the next [`ToolOrchestrator::get_mcp_tools`]
    /// performs a fresh discovery.
    pub fn refresh_mcp_tools(&mut self) {
        self.cache.force_refresh();
    }

    /// Age of the cached listing, for diagnostics surfaces.
    pub fn cache_age(&self) -> Option<Duration> {
        self.cache.cache_age()
    }

    /// Validates the configuration, then runs one connect-probe-disconnect
    /// cycle against the remote server.
    pub async fn test_mcp(&self, config: &McpConfig) -> ConnectionTest {
        let violations = PolicyEngine::validate_config(config);
        if !violations.is_empty() {
            return ConnectionTest {
                success: false,
                server_info: None,
                error: Some(format!("{TAG_CONFIG}: {}", violations.join(" "))),
            };
        }

        let mut client = McpClient::new(config.clone());
        match client.test_connection().await {
            Ok(info) => ConnectionTest {
                success: true,
                server_info: Some(info),
                error: None,
            },
            Err(err) => ConnectionTest {
                success: false,
                server_info: None,
                error: Some(err.to_string()),
            },
        }
    }
}

fn adapt_all(descriptors: &[ToolDescriptor]) -> Vec<ChatToolDefinition> {
    descriptors
        .iter()
        .enumerate()
        .map(|(index, descriptor)| adapt_tool(index, descriptor))
        .collect()
}
