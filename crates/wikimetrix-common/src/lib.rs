//! Common utilities and types for wiki-metrix

pub mod error;
pub mod logging;
pub mod macros;
pub mod types;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod test_utils;

// Re-export commonly used types
pub use error::{MetrixError, Result};
pub use logging::{init_default_logging, init_logging, LogFormat, LoggingConfig};
pub use types::*;
pub use utils::*;
