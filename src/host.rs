//! Inbound entry points for the embedding host.
//!
//! The host keeps its own flat key-value settings store; this facade turns
//! those settings into a typed [`McpConfig`] on every call and drives the
//! orchestrator with it. Nothing here persists settings or caches
//! configuration between calls, so edits in the host take effect on the
//! next operation.

use crate::api::{ChatToolCall, ChatToolDefinition};
use crate::core::config::io::ConfigError;
use crate::core::config::McpConfig;
use crate::mcp::error::TAG_INVALID_ARGUMENT;
use crate::mcp::orchestrator::{ConnectionTest, ToolInvocation, ToolOrchestrator};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

pub struct McpHost {
    orchestrator: ToolOrchestrator,
    /// Configuration from the optional TOML override file. When present it
    /// replaces the settings map entirely.
    file_config: Option<McpConfig>,
}

impl Default for McpHost {
    fn default() -> Self {
        Self::new()
    }
}

impl McpHost {
    pub fn new() -> Self {
        Self {
            orchestrator: ToolOrchestrator::new(),
            file_config: None,
        }
    }

    /// Like [`McpHost::new`], but reads the TOML override file from the
    /// platform config directory if one exists there.
    pub fn with_config_file() -> Result<Self, ConfigError> {
        let file_config = match McpConfig::default_config_path() {
            Some(path) => McpConfig::load_from_path(&path)?,
            None => None,
        };
        Ok(Self {
            orchestrator: ToolOrchestrator::new(),
            file_config,
        })
    }

    fn resolve_config(&self, settings: &HashMap<String, String>) -> McpConfig {
        match &self.file_config {
            Some(config) => config.clone(),
            None => McpConfig::from_settings(settings),
        }
    }

    /// Remote tools in the assistant's format, for the host to splice into
    /// its chat completion requests. Empty when MCP is disabled or the
    /// server is unreachable.
    pub async fn load_mcp_tools(
        &mut self,
        settings: &HashMap<String, String>,
    ) -> Vec<ChatToolDefinition> {
        let config = self.resolve_config(settings);
        self.orchestrator.get_mcp_tools(&config).await
    }

    /// Invokes a prefixed tool name with an already-parsed argument tree.
    pub async fn invoke_mcp_tool(
        &mut self,
        name: &str,
        arguments: Value,
        settings: &HashMap<String, String>,
    ) -> ToolInvocation {
        let config = self.resolve_config(settings);
        self.orchestrator
            .invoke_mcp_tool(name, arguments, &config)
            .await
    }

    /// Invokes a tool call as emitted by the assistant, where the arguments
    /// arrive as a JSON-encoded string. An empty string means no arguments;
    /// anything else that fails to parse is rejected without touching the
    /// network.
    pub async fn invoke_tool_call(
        &mut self,
        call: &ChatToolCall,
        settings: &HashMap<String, String>,
    ) -> ToolInvocation {
        let raw = call.function.arguments.trim();
        let arguments = if raw.is_empty() {
            json!({})
        } else {
            match serde_json::from_str::<Value>(raw) {
                Ok(arguments) => arguments,
                Err(err) => {
                    return ToolInvocation::failure(
                        TAG_INVALID_ARGUMENT,
                        &format!("Tool call arguments are not valid JSON: {err}"),
                    )
                }
            }
        };
        self.invoke_mcp_tool(&call.function.name, arguments, settings)
            .await
    }

    pub async fn test_mcp(&self, settings: &HashMap<String, String>) -> ConnectionTest {
        let config = self.resolve_config(settings);
        self.orchestrator.test_mcp(&config).await
    }

    /// Drops the cached tool listing so the next load rediscovers.
    pub fn refresh_mcp(&mut self) {
        self.orchestrator.refresh_mcp_tools();
    }

    pub fn tool_cache_age(&self) -> Option<Duration> {
        self.orchestrator.cache_age()
    }
}
