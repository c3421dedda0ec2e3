//! Test utilities and shared fixtures for the wiki-metrix workspace.
//!
//! Available to other crates through the `testing` feature.

use crate::types::{DateRange, Project};
use chrono::NaiveDate;
use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize logging for tests. Safe to call from every test.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
        let _ = fmt().with_test_writer().with_env_filter(filter).try_init();
    });
}

/// Calendar date fixture
pub fn mock_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// Inclusive range fixture
pub fn mock_range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
    DateRange::new(mock_date(start.0, start.1, start.2), mock_date(end.0, end.1, end.2))
        .expect("valid fixture range")
}

/// German Wikipedia, the project most fixtures use
pub fn de_wikipedia() -> Project {
    Project::new("de", "wikipedia")
}

/// Create a temporary directory that is removed on drop
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Write `contents` to a named temporary file
pub fn create_temp_file_with(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temporary file");
    file.write_all(contents.as_bytes()).expect("Failed to write temporary file");
    file
}

/// JSON bodies shaped like real Wikimedia responses
pub mod json_fixtures {
    use serde_json::{json, Value};

    /// Per-article page-view response with one item per `(timestamp, views)`
    pub fn pageviews_body(article: &str, granularity: &str, items: &[(&str, Option<u64>)]) -> Value {
        let items: Vec<Value> = items
            .iter()
            .map(|(timestamp, views)| {
                json!({
                    "project": "de.wikipedia",
                    "article": article,
                    "granularity": granularity,
                    "timestamp": timestamp,
                    "access": "all-access",
                    "agent": "user",
                    "views": views,
                })
            })
            .collect();
        json!({ "items": items })
    }

    /// Action API error body
    pub fn action_error_body(code: &str, info: &str) -> Value {
        json!({ "error": { "code": code, "info": info } })
    }
}
