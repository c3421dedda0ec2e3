//! Configuration management for wiki-metrix

pub mod loader;
pub mod settings;
pub mod validation;

pub use loader::{ConfigError, ConfigLoader};
pub use settings::{
    ApiConfig, Config, GraphFormat, GraphSettings, LoggingSettings, OutputConfig, SelectionConfig,
    SiteConfig, DEFAULT_USER_AGENT,
};
