//! Configuration loading utilities

use crate::Config;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::debug;
use wikimetrix_common::{MetrixError, Result as MetrixResult};

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_VAR: &str = "WIKIMETRIX_CONFIG_PATH";

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "wikimetrix.toml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        var: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for MetrixError {
    fn from(err: ConfigError) -> Self {
        MetrixError::config_with_source(err.to_string(), err)
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        debug!(path = %path.as_ref().display(), "Reading configuration file");
        let content = std::fs::read_to_string(path.as_ref())?;
        let mut config = Self::parse(&content)?;

        Self::apply_env_overrides(&mut config)?;

        config.validate_all()?;

        Ok(config)
    }

    /// Parse TOML text; missing sections and keys take their defaults
    pub fn parse(content: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from `WIKIMETRIX_CONFIG_PATH`, `./wikimetrix.toml`
    /// or the built-in defaults, in that order
    pub fn load() -> MetrixResult<Config> {
        let config = if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            Self::load_config(&config_path)?
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::load_config(DEFAULT_CONFIG_FILE)?
        } else {
            debug!("No configuration file found, using defaults");
            let mut config = Config::default();
            Self::apply_env_overrides(&mut config)?;
            config.validate_all().map_err(ConfigError::ValidationError)?;
            config
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> MetrixResult<Config> {
        Ok(Self::load_config(path)?)
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        if let Ok(user_agent) = env::var("WIKIMETRIX_USER_AGENT") {
            config.api.user_agent = user_agent;
        }

        if let Ok(timeout) = env::var("WIKIMETRIX_TIMEOUT") {
            config.api.timeout_secs = timeout.parse().map_err(|e| ConfigError::EnvParseError {
                var: "WIKIMETRIX_TIMEOUT".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(rate_limit) = env::var("WIKIMETRIX_RATE_LIMIT") {
            config.api.rate_limit_per_sec = rate_limit.parse().map_err(|e| ConfigError::EnvParseError {
                var: "WIKIMETRIX_RATE_LIMIT".to_string(),
                source: Box::new(e),
            })?;
        }

        if let Ok(lang) = env::var("WIKIMETRIX_LANG") {
            config.site.lang = lang;
        }

        if let Ok(family) = env::var("WIKIMETRIX_SITE") {
            config.site.family = family;
        }

        if let Ok(level) = env::var("WIKIMETRIX_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Ok(directory) = env::var("WIKIMETRIX_OUTPUT_DIR") {
            config.output.directory = directory;
        }

        Ok(())
    }
}
