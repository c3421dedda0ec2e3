//! Utility functions used across wiki-metrix

use crate::{MetrixError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

static QID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^Q\d+$").unwrap());

static ENTITY_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://www\.wikidata\.org/entity/(Q\d+)$").unwrap());

/// Timestamp format used in output tables
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Parse a calendar date given as `YYYY-MM-DD` or `YYYYMMDD`.
///
/// Years outside 0000-9999 are rejected.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let value = value.trim();
    let four_digit_year = value.len() >= 4 && value.as_bytes()[..4].iter().all(u8::is_ascii_digit);
    let compact = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());
    if !four_digit_year || !(compact || value.as_bytes().get(4) == Some(&b'-')) {
        return Err(MetrixError::Validation {
            message: format!("'{value}' is not a valid date (expected YYYY-MM-DD)"),
            field: Some("date".to_string()),
        });
    }
    let format = if compact {
        "%Y%m%d"
    } else {
        "%Y-%m-%d"
    };
    NaiveDate::parse_from_str(value, format).map_err(|e| MetrixError::Validation {
        message: format!("'{value}' is not a valid date (expected YYYY-MM-DD): {e}"),
        field: Some("date".to_string()),
    })
}

/// Date as used in REST paths: `YYYYMMDD`
pub fn format_rest_date(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse a REST metrics timestamp (`YYYYMMDDHH`) into its calendar day
pub fn parse_rest_timestamp(value: &str) -> Result<NaiveDate> {
    let day = value.get(..8).ok_or_else(|| {
        MetrixError::validation_field(format!("malformed timestamp '{value}'"), "timestamp")
    })?;
    NaiveDate::parse_from_str(day, "%Y%m%d").map_err(|e| {
        MetrixError::validation_field(format!("malformed timestamp '{value}': {e}"), "timestamp")
    })
}

/// Parse an ISO 8601 timestamp as returned by the Action API
pub fn parse_api_timestamp(value: &str) -> Result<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| {
            MetrixError::validation_field(format!("malformed timestamp '{value}': {e}"), "timestamp")
        })
}

/// Format a timestamp for output tables
pub fn format_timestamp_utc(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Turn an article title into a single REST path segment.
///
/// Spaces become underscores, then every reserved character is
/// percent-encoded, `/` included.
pub fn title_to_path_segment(title: &str) -> String {
    urlencoding::encode(&title.trim().replace(' ', "_")).into_owned()
}

/// Normalise a main-namespace title the way MediaWiki does
pub fn normalize_title(title: &str) -> String {
    let spaced = title.replace('_', " ");
    let collapsed = spaced.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whether the value is a Wikidata item id such as `Q42`
pub fn is_qid(value: &str) -> bool {
    QID_RE.is_match(value)
}

/// Whether the value is the entity URL of a Wikidata item
pub fn is_wikidata_entity_url(value: &str) -> bool {
    ENTITY_URL_RE.is_match(value)
}

/// `https://www.wikidata.org/entity/Q42` -> `Q42`; other values unchanged
pub fn strip_wikidata_entity_prefix(value: &str) -> String {
    ENTITY_URL_RE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| value.to_string(), |qid| qid.as_str().to_string())
}

/// Validate that a string is not empty after trimming
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(MetrixError::validation_field(
            format!("{} cannot be empty", field_name),
            field_name,
        ))
    } else {
        Ok(trimmed.to_string())
    }
}
