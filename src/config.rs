//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::fetcher::HttpSourceConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Local storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("finboard").to_string_lossy().to_string())
        .unwrap_or_else(|| "./finboard_data".to_string())
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded
    pub fn data_path(&self) -> PathBuf {
        match self.data_dir.strip_prefix("~/") {
            Some(rest) => dirs::home_dir()
                .map(|home| home.join(rest))
                .unwrap_or_else(|| PathBuf::from(&self.data_dir)),
            None => PathBuf::from(&self.data_dir),
        }
    }
}

/// Widget data fetching configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Refresh interval for new widgets that don't specify one (seconds)
    #[serde(default = "default_refresh_secs")]
    pub default_refresh_secs: u64,

    /// Per-request timeout in seconds; 0 disables it
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_refresh_secs() -> u64 {
    crate::storage::DEFAULT_REFRESH_SECS
}

fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("finboard/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            default_refresh_secs: default_refresh_secs(),
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Settings for the HTTP source
    pub fn http_source_config(&self) -> HttpSourceConfig {
        HttpSourceConfig {
            request_timeout: (self.request_timeout_secs > 0)
                .then(|| Duration::from_secs(self.request_timeout_secs)),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, else default locations, else environment
    pub fn load_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_with_env(path);
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("finboard").join("config.toml")),
            Some(PathBuf::from("/etc/finboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("FINBOARD_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }

        // Fetch overrides
        if let Some(secs) = var("FINBOARD_REFRESH_SECS").and_then(|s| s.parse().ok()) {
            if secs > 0 {
                self.fetch.default_refresh_secs = secs;
            }
        }
        if let Some(secs) = var("FINBOARD_REQUEST_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.fetch.request_timeout_secs = secs;
        }

        // Logging overrides
        if let Some(level) = var("FINBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("FINBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Finboard Configuration
#
# Environment variables override these settings:
# - FINBOARD_DATA_DIR
# - FINBOARD_REFRESH_SECS
# - FINBOARD_REQUEST_TIMEOUT_SECS
# - FINBOARD_LOG_LEVEL
# - FINBOARD_LOG_FORMAT

[storage]
# Directory holding the widget collection and theme preference
data_dir = "~/.local/share/finboard"

[fetch]
# Refresh interval for widgets created without one (seconds)
default_refresh_secs = 10

# Per-request timeout in seconds (0 = wait as long as the transport allows)
request_timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
