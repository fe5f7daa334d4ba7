//! Stateless authorization over the live MCP configuration.
//!
//! The engine holds one configuration at a time and is reconfigured
//! wholesale before each host-facing operation; it is never mutated
//! field-by-field. Every check is computed fresh and nothing is persisted.

use crate::core::config::data::McpConfig;
use serde_json::Value;

/// A verdict plus an optional human-readable reason for denial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl PolicyDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

#[derive(Debug, Default)]
pub struct PolicyEngine {
    config: McpConfig,
}

impl PolicyEngine {
    pub fn new(config: McpConfig) -> Self {
        Self { config }
    }

    /// Replaces the whole configuration atomically.
    pub fn reconfigure(&mut self, config: McpConfig) {
        self.config = config;
    }

    /// Decides whether the named tool may run. Matching is exact string
    /// equality, case-sensitive, against the unprefixed tool name. Deny-list
    /// membership always wins over allow-list membership.
    pub fn check_tool_access(&self, name: &str) -> PolicyDecision {
        if !self.config.enabled {
            return PolicyDecision::deny("MCP integration is not enabled.");
        }
        if self.config.denied_tools.iter().any(|denied| denied == name) {
            return PolicyDecision::deny(format!("Tool '{name}' is in the deny list."));
        }
        if !self.config.allowed_tools.is_empty()
            && !self
                .config
                .allowed_tools
                .iter()
                .any(|allowed| allowed == name)
        {
            return PolicyDecision::deny(format!("Tool '{name}' is not in the allow list."));
        }
        PolicyDecision::allow()
    }

    /// Measures the canonical serialized form of the argument tree against
    /// the configured ceiling. An absent ceiling allows unconditionally; a
    /// payload exactly at the ceiling is allowed.
    pub fn check_argument_size(&self, arguments: &Value) -> PolicyDecision {
        let Some(ceiling_kb) = self.config.max_argument_kb else {
            return PolicyDecision::allow();
        };
        let ceiling_bytes = ceiling_kb.saturating_mul(1024);
        let size = match serde_json::to_vec(arguments) {
            Ok(bytes) => bytes.len() as u64,
            Err(err) => {
                return PolicyDecision::deny(format!("Arguments are not serializable: {err}"))
            }
        };
        if size > ceiling_bytes {
            return PolicyDecision::deny(format!(
                "Arguments are {size} bytes; the configured ceiling is {ceiling_bytes} bytes ({ceiling_kb} KB)."
            ));
        }
        PolicyDecision::allow()
    }

    /// Checks a configuration for internal consistency. Returns every
    /// violated rule so the host can present all problems at once. A
    /// disabled configuration is always valid.
    pub fn validate_config(config: &McpConfig) -> Vec<String> {
        let mut violations = Vec::new();
        if !config.enabled {
            return violations;
        }

        match config.server_url.as_deref().map(str::trim) {
            None | Some("") => {
                violations.push("Server URL is required when MCP is enabled.".to_string());
            }
            Some(url) => match reqwest::Url::parse(url) {
                Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
                Ok(parsed) => violations.push(format!(
                    "Server URL must use http or https, got '{}'.",
                    parsed.scheme()
                )),
                Err(err) => violations.push(format!("Server URL is not valid: {err}.")),
            },
        }

        if config.timeout_ms < 1000 {
            violations.push(format!(
                "Request timeout must be at least 1000 ms, got {} ms.",
                config.timeout_ms
            ));
        }
        if let Some(kb) = config.max_argument_kb {
            if kb < 1 {
                violations.push("Argument size ceiling must be at least 1 KB.".to_string());
            }
        }

        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn enabled_config() -> McpConfig {
        McpConfig {
            enabled: true,
            server_url: Some("https://mcp.example.com/rpc".to_string()),
            ..McpConfig::default()
        }
    }

    #[test]
    fn disabled_config_denies_every_tool() {
        let engine = PolicyEngine::new(McpConfig::default());
        let decision = engine.check_tool_access("search");
        assert!(!decision.allowed);
        assert!(decision.reason.expect("reason").contains("not enabled"));
    }

    #[test]
    fn deny_list_wins_over_allow_list() {
        let engine = PolicyEngine::new(McpConfig {
            allowed_tools: vec!["search".to_string()],
            denied_tools: vec!["search".to_string()],
            ..enabled_config()
        });
        let decision = engine.check_tool_access("search");
        assert!(!decision.allowed);
        assert!(decision.reason.expect("reason").contains("deny list"));
    }

    #[test]
    fn empty_allow_list_admits_everything_not_denied() {
        let engine = PolicyEngine::new(McpConfig {
            denied_tools: vec!["delete_note".to_string()],
            ..enabled_config()
        });
        assert!(engine.check_tool_access("search").allowed);
        assert!(!engine.check_tool_access("delete_note").allowed);
    }

    #[test]
    fn non_empty_allow_list_excludes_unlisted_tools() {
        let engine = PolicyEngine::new(McpConfig {
            allowed_tools: vec!["search".to_string()],
            ..enabled_config()
        });
        assert!(engine.check_tool_access("search").allowed);
        let decision = engine.check_tool_access("fetch_note");
        assert!(!decision.allowed);
        assert!(decision.reason.expect("reason").contains("allow list"));
    }

    #[test]
    fn matching_is_case_sensitive() {
        let engine = PolicyEngine::new(McpConfig {
            denied_tools: vec!["Search".to_string()],
            ..enabled_config()
        });
        assert!(engine.check_tool_access("search").allowed);
    }

    #[test]
    fn argument_size_is_allowed_at_the_ceiling_and_denied_one_byte_over() {
        let engine = PolicyEngine::new(McpConfig {
            max_argument_kb: Some(1),
            ..enabled_config()
        });

        // {"q":"..."} serializes to 8 bytes of framing plus the payload.
        let at_ceiling = json!({"q": "x".repeat(1024 - 8)});
        let serialized = serde_json::to_vec(&at_ceiling).expect("serialize");
        assert_eq!(serialized.len(), 1024);
        assert!(engine.check_argument_size(&at_ceiling).allowed);

        let one_over = json!({"q": "x".repeat(1024 - 7)});
        let decision = engine.check_argument_size(&one_over);
        assert!(!decision.allowed);
        let reason = decision.reason.expect("reason");
        assert!(reason.contains("1025 bytes"));
        assert!(reason.contains("1024 bytes"));
        assert!(reason.contains("1 KB"));
    }

    #[test]
    fn absent_ceiling_allows_unconditionally() {
        let engine = PolicyEngine::new(enabled_config());
        let huge = json!({"q": "x".repeat(1 << 20)});
        assert!(engine.check_argument_size(&huge).allowed);
    }

    #[test]
    fn validate_config_accepts_disabled_anything() {
        let config = McpConfig {
            timeout_ms: 0,
            ..McpConfig::default()
        };
        assert!(PolicyEngine::validate_config(&config).is_empty());
    }

    #[test]
    fn validate_config_reports_every_violation() {
        let config = McpConfig {
            enabled: true,
            server_url: Some("ftp://example.com".to_string()),
            timeout_ms: 100,
            max_argument_kb: Some(0),
            ..McpConfig::default()
        };
        let violations = PolicyEngine::validate_config(&config);
        assert_eq!(violations.len(), 3);
    }

    #[test]
    fn validate_config_requires_a_url() {
        let config = McpConfig {
            enabled: true,
            ..McpConfig::default()
        };
        let violations = PolicyEngine::validate_config(&config);
        assert!(violations
            .iter()
            .any(|violation| violation.contains("Server URL is required")));
    }

    #[test]
    fn validate_config_passes_a_sound_configuration() {
        assert!(PolicyEngine::validate_config(&enabled_config()).is_empty());
    }
}
