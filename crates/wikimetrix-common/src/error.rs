//! Error types and utilities for wiki-metrix

use thiserror::Error;

/// Result type alias for wiki-metrix operations
pub type Result<T> = std::result::Result<T, MetrixError>;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for wiki-metrix operations
#[derive(Error, Debug)]
pub enum MetrixError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// I/O related errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Transport level failures (timeouts, refused connections, TLS)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// The Wikimedia API answered, but with an error
    #[error("Wikimedia API error: {message}")]
    Api {
        message: String,
        status_code: Option<u16>,
        /// MediaWiki error code such as `missingtitle` or `badvalue`
        code: Option<String>,
    },

    /// A page, article or entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Reading or writing delimited tables
    #[error("Table error: {0}")]
    Csv(#[from] csv::Error),

    /// Graph generation and plotting errors
    #[error("Graph error: {message}")]
    Graph {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },
}

impl MetrixError {
    /// Create a new generic error with a custom message
    pub fn new(msg: impl Into<String>) -> Self {
        Self::Generic {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new configuration error with source
    pub fn config_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Config {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new network error with source
    pub fn network_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Network {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api {
            message: msg.into(),
            status_code: None,
            code: None,
        }
    }

    /// Create a new API error carrying the HTTP status
    pub fn api_with_status(msg: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: msg.into(),
            status_code: Some(status),
            code: None,
        }
    }

    /// Create a new API error carrying the MediaWiki error code
    pub fn api_with_code(msg: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Api {
            message: msg.into(),
            status_code: None,
            code: Some(code.into()),
        }
    }

    /// Create a new not-found error
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create a new graph error
    pub fn graph(msg: impl Into<String>) -> Self {
        Self::Graph {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a new graph error with source
    pub fn graph_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Graph {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Whether this error means the requested page does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Convert from reqwest::Error to MetrixError
impl From<reqwest::Error> for MetrixError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network_with_source("Request timeout", err)
        } else if err.is_connect() {
            Self::network_with_source("Connection failed", err)
        } else if err.is_decode() {
            Self::network_with_source("Failed to decode response body", err)
        } else if let Some(status) = err.status() {
            Self::api_with_status(format!("HTTP error: {}", status), status.as_u16())
        } else {
            Self::network_with_source("Network request failed", err)
        }
    }
}

/// Convert from toml::de::Error to MetrixError
impl From<toml::de::Error> for MetrixError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML parsing error", err)
    }
}

#[cfg(feature = "plotters")]
/// Convert from plotters drawing errors to MetrixError
impl<T> From<plotters::drawing::DrawingAreaErrorKind<T>> for MetrixError
where
    T: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<T>) -> Self {
        Self::graph_with_source("Graph rendering failed", err)
    }
}
