//! Application configuration structures

use serde::{Deserialize, Serialize};
use validator::Validate;
use wikimetrix_common::{LogFormat, LoggingConfig, Project};

/// Descriptive user agent sent with every request, as Wikimedia policy requires
pub const DEFAULT_USER_AGENT: &str = concat!(
    "wiki-metrix/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/temporal-communities/wiki-metrix)"
);

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct Config {
    /// HTTP client and endpoint settings
    #[validate(nested)]
    pub api: ApiConfig,

    /// Default language edition and site family
    #[validate(nested)]
    pub site: SiteConfig,

    /// How selections are read
    #[validate(nested)]
    pub selection: SelectionConfig,

    /// Table output
    #[validate(nested)]
    pub output: OutputConfig,

    /// Graph rendering settings
    #[validate(nested)]
    pub graph: GraphSettings,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingSettings,
}

/// HTTP client and endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ApiConfig {
    /// User agent header
    #[validate(length(min = 1, message = "User agent cannot be empty"))]
    pub user_agent: String,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_secs: u64,

    /// Upper bound on requests per second
    #[validate(range(min = 1, max = 200, message = "Rate limit must be between 1 and 200 requests per second"))]
    pub rate_limit_per_sec: u32,

    /// Idle connections kept per host
    #[validate(range(max = 64, message = "Idle connections per host cannot exceed 64"))]
    pub max_idle_per_host: usize,

    /// Continuation pages fetched per listing before it is truncated
    #[validate(range(min = 1, max = 10000, message = "Page cap must be between 1 and 10000"))]
    pub action_api_max_pages: u32,

    /// Base of the Wikibase REST API
    #[validate(url(message = "Wikidata REST base must be a valid URL"))]
    pub wikidata_rest_base: String,

    /// Base of the page-view metrics REST API
    #[validate(url(message = "Pageviews REST base must be a valid URL"))]
    pub pageviews_rest_base: String,
}

/// Default project
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SiteConfig {
    /// Language code
    #[validate(length(min = 1, message = "Language cannot be empty"))]
    #[validate(custom(function = "crate::validation::validate_language_code"))]
    pub lang: String,

    /// Site family, e.g. wikipedia
    #[validate(length(min = 1, message = "Site family cannot be empty"))]
    pub family: String,
}

/// Selection input settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct SelectionConfig {
    /// Column of the input file holding titles or Wikidata ids
    #[validate(length(min = 1, message = "Input column cannot be empty"))]
    pub input_column: String,

    /// Whether category selections descend into sub-categories
    pub recursive_categories: bool,
}

/// Table output settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct OutputConfig {
    /// Field separator, a single ASCII character
    #[validate(custom(function = "crate::validation::validate_separator"))]
    pub separator: String,

    /// Directory for relative output paths
    #[validate(custom(function = "crate::validation::validate_file_path"))]
    pub directory: String,
}

/// Image format of rendered graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    #[default]
    Png,
    Svg,
}

impl GraphFormat {
    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }
}

/// Graph rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GraphSettings {
    /// Graph width in pixels
    #[validate(range(min = 100, max = 4000, message = "Width must be between 100 and 4000 pixels"))]
    pub width: u32,

    /// Graph height in pixels
    #[validate(range(min = 100, max = 4000, message = "Height must be between 100 and 4000 pixels"))]
    pub height: u32,

    /// Background color (hex format)
    #[validate(custom(function = "crate::validation::validate_hex_color"))]
    pub background_color: String,

    /// Line and bar color (hex format)
    #[validate(custom(function = "crate::validation::validate_hex_color"))]
    pub primary_color: String,

    /// Shade Saturdays and Sundays on daily charts
    pub highlight_weekends: bool,

    /// Format used when a plot path has no extension
    pub format: GraphFormat,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level (trace, debug, info, warn, error)
    #[validate(custom(function = "crate::validation::validate_log_level"))]
    pub level: String,

    /// Line format
    pub format: LogFormat,

    /// Log file; empty means stderr
    pub file: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 30,
            rate_limit_per_sec: 10,
            max_idle_per_host: 4,
            action_api_max_pages: 50,
            wikidata_rest_base: "https://www.wikidata.org/w/rest.php/wikibase/v1".to_string(),
            pageviews_rest_base: "https://wikimedia.org/api/rest_v1/metrics/pageviews".to_string(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            lang: "en".to_string(),
            family: "wikipedia".to_string(),
        }
    }
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            input_column: "article".to_string(),
            recursive_categories: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            separator: "\t".to_string(),
            directory: ".".to_string(),
        }
    }
}

impl Default for GraphSettings {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background_color: "#FFFFFF".to_string(),
            primary_color: "#1F77B4".to_string(),
            highlight_weekends: true,
            format: GraphFormat::Png,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            file: String::new(),
        }
    }
}

impl Config {
    /// Comprehensive validation of the entire configuration
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.validate()
    }

    /// The configured default project
    pub fn project(&self) -> Project {
        Project::new(&self.site.lang, &self.site.family)
    }

    /// Separator as the single byte the csv crate expects
    pub fn separator_byte(&self) -> u8 {
        self.output.separator.as_bytes().first().copied().unwrap_or(b'\t')
    }
}

impl LoggingSettings {
    /// Settings for `wikimetrix_common::init_logging`
    pub fn to_logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.level.clone(),
            format: self.format,
            file_path: Some(self.file.clone()).filter(|f| !f.is_empty()),
            ..LoggingConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate_all().is_ok());
        assert_eq!(config.project(), Project::new("en", "wikipedia"));
        assert_eq!(config.separator_byte(), b'\t');
        assert!(config.api.user_agent.starts_with("wiki-metrix/"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = Config::default();
        config.api.timeout_secs = 0;
        config.graph.primary_color = "blue".to_string();
        let errors = config.validate_all().unwrap_err();
        let sections = errors.errors();
        assert!(sections.contains_key("api"));
        assert!(sections.contains_key("graph"));
        assert!(!sections.contains_key("logging"));
    }

    #[test]
    fn test_logging_settings_conversion() {
        let mut settings = LoggingSettings::default();
        assert!(settings.to_logging_config().file_path.is_none());

        settings.file = "wikimetrix.log".to_string();
        settings.format = LogFormat::Json;
        let config = settings.to_logging_config();
        assert_eq!(config.file_path.as_deref(), Some("wikimetrix.log"));
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn test_graph_format_extension() {
        assert_eq!(GraphFormat::Svg.extension(), "svg");
        assert_eq!(GraphFormat::default().extension(), "png");
    }
}
