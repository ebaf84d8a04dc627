//! Configuration System
//!
//! Handles loading configuration for the `druid-query` tool from TOML files
//! and environment variables. Environment variables override file values.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
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

/// Document rendering defaults
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Indent rendered documents
    #[serde(default)]
    pub pretty: bool,

    /// Granularity used when a command does not pass one
    #[serde(default = "default_granularity")]
    pub default_granularity: String,

    /// Data source used when a command does not pass one
    #[serde(default)]
    pub default_data_source: Option<String>,
}

fn default_granularity() -> String {
    "all".to_string()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: false,
            default_granularity: default_granularity(),
            default_data_source: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load from file with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("druid-query").join("config.toml")),
            Some(PathBuf::from("/etc/druid-query/config.toml")),
            Some(PathBuf::from("./druid-query.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("DRUID_QUERY_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("DRUID_QUERY_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Ok(pretty) = std::env::var("DRUID_QUERY_PRETTY") {
            if let Ok(p) = pretty.parse() {
                self.output.pretty = p;
            }
        }
        if let Ok(data_source) = std::env::var("DRUID_QUERY_DATA_SOURCE") {
            self.output.default_data_source = Some(data_source);
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
    r#"# druid-query Configuration
#
# Environment variables override these settings:
# - DRUID_QUERY_LOG_LEVEL
# - DRUID_QUERY_LOG_FORMAT
# - DRUID_QUERY_PRETTY
# - DRUID_QUERY_DATA_SOURCE

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

[output]
# Indent rendered query documents
pretty = false

# Granularity used when none is given on the command line
default_granularity = "all"

# Data source used when none is given on the command line
# default_data_source = "wikipedia"
"#
    .to_string()
}
