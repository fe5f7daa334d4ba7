use crate::core::config::data::McpConfig;
use directories::ProjectDirs;
use std::error::Error as StdError;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur when loading an MCP configuration file from disk.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to parse the configuration file as valid TOML.
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "Failed to read config at {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(
                    f,
                    "Failed to parse config at {}: {}",
                    path.display(),
                    source
                )
            }
        }
    }
}

impl StdError for ConfigError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
        }
    }
}

impl McpConfig {
    /// Default location for a standalone configuration file, for hosts that
    /// do not carry their own settings store.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "permacommons", "notabene")
            .map(|dirs| dirs.config_dir().join("mcp.toml"))
    }

    /// Loads a configuration from a TOML file. A missing file is not an
    /// error; it simply yields no configuration.
    pub fn load_from_path(path: &Path) -> Result<Option<McpConfig>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(config))
    }
}
