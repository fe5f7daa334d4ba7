use crate::mcp::transport::McpTransportKind;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// Settings keys this crate reads from the host's flat key-value settings
/// map. The host owns the map and its persistence; nothing else is read.
pub mod settings_keys {
    pub const ENABLED: &str = "mcp_enabled";
    pub const SERVER_URL: &str = "mcp_server_url";
    pub const AUTH_TOKEN: &str = "mcp_auth_token";
    pub const TRANSPORT: &str = "mcp_transport";
    pub const TIMEOUT_MS: &str = "mcp_timeout_ms";
    pub const MAX_ARGUMENT_KB: &str = "mcp_max_argument_kb";
    /// Comma-separated unprefixed tool names.
    pub const ALLOWED_TOOLS: &str = "mcp_allowed_tools";
    /// Comma-separated unprefixed tool names; deny wins over allow.
    pub const DENIED_TOOLS: &str = "mcp_denied_tools";
    pub const REFRESH_ON_START: &str = "mcp_refresh_on_start";
}

pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// One MCP server configuration, rebuilt wholesale from host settings before
/// each operation and immutable for its duration.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct McpConfig {
    #[serde(default)]
    pub enabled: bool,
    pub server_url: Option<String>,
    pub auth_token: Option<String>,
    #[serde(default)]
    pub transport: McpTransportKind,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Per-call ceiling on the serialized argument size. Absent means no
    /// ceiling is enforced.
    pub max_argument_kb: Option<u64>,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(default)]
    pub denied_tools: Vec<String>,
    #[serde(default)]
    pub refresh_on_start: bool,
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: None,
            auth_token: None,
            transport: McpTransportKind::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_argument_kb: None,
            allowed_tools: Vec::new(),
            denied_tools: Vec::new(),
            refresh_on_start: false,
        }
    }
}

impl McpConfig {
    /// Builds a configuration from the host's settings map. Unparseable
    /// values fall back to defaults with a warning rather than failing the
    /// whole operation.
    pub fn from_settings(settings: &HashMap<String, String>) -> Self {
        let mut config = McpConfig::default();

        if let Some(value) = settings.get(settings_keys::ENABLED) {
            config.enabled = parse_bool(settings_keys::ENABLED, value).unwrap_or(false);
        }
        config.server_url = non_empty(settings.get(settings_keys::SERVER_URL));
        config.auth_token = non_empty(settings.get(settings_keys::AUTH_TOKEN));
        if let Some(value) = settings.get(settings_keys::TRANSPORT) {
            match McpTransportKind::from_setting(value) {
                Ok(kind) => config.transport = kind,
                Err(err) => warn!(key = settings_keys::TRANSPORT, %err, "Ignoring setting"),
            }
        }
        if let Some(value) = settings.get(settings_keys::TIMEOUT_MS) {
            match value.trim().parse::<u64>() {
                Ok(timeout_ms) => config.timeout_ms = timeout_ms,
                Err(_) => warn!(
                    key = settings_keys::TIMEOUT_MS,
                    value, "Ignoring non-numeric setting"
                ),
            }
        }
        if let Some(value) = settings.get(settings_keys::MAX_ARGUMENT_KB) {
            match value.trim().parse::<u64>() {
                Ok(kb) => config.max_argument_kb = Some(kb),
                Err(_) => warn!(
                    key = settings_keys::MAX_ARGUMENT_KB,
                    value, "Ignoring non-numeric setting"
                ),
            }
        }
        if let Some(value) = settings.get(settings_keys::ALLOWED_TOOLS) {
            config.allowed_tools = parse_tool_list(value);
        }
        if let Some(value) = settings.get(settings_keys::DENIED_TOOLS) {
            config.denied_tools = parse_tool_list(value);
        }
        if let Some(value) = settings.get(settings_keys::REFRESH_ON_START) {
            config.refresh_on_start =
                parse_bool(settings_keys::REFRESH_ON_START, value).unwrap_or(false);
        }

        config
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn parse_bool(key: &str, value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" => Some(false),
        other => {
            warn!(key, value = other, "Ignoring non-boolean setting");
            None
        }
    }
}

fn parse_tool_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
