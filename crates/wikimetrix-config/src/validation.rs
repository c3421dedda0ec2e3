//! Validation utilities and regex patterns

use regex::Regex;
use std::sync::LazyLock;
use validator::ValidationError;

/// Regex pattern for validating hex color codes (e.g., #FFFFFF, #FF0000)
pub static HEX_COLOR_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("Invalid hex color regex pattern")
});

/// Wikimedia language codes: `de`, `als`, `zh-min-nan`, `be-x-old`
pub static LANGUAGE_CODE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z]{2,3}(-[a-z]+)*$").expect("Invalid language code regex pattern")
});

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a `#RRGGBB` colour
pub fn validate_hex_color(color: &str) -> Result<(), ValidationError> {
    if HEX_COLOR_REGEX.is_match(color) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_hex_color"))
    }
}

/// Validate a language code
pub fn validate_language_code(lang: &str) -> Result<(), ValidationError> {
    if LANGUAGE_CODE_REGEX.is_match(lang) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_language_code"))
    }
}

/// Validate a log level; directives such as `wikimetrix_api=debug` are accepted
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if level.is_empty() {
        return Err(ValidationError::new("empty_log_level"));
    }

    let valid = level.split(',').all(|directive| {
        let level = directive.rsplit('=').next().unwrap_or(directive).trim();
        LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str())
    });
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

/// Validate a field separator: exactly one ASCII character, not a quote or newline
pub fn validate_separator(separator: &str) -> Result<(), ValidationError> {
    match separator.as_bytes() {
        [b'"'] | [b'\n'] | [b'\r'] => Err(ValidationError::new("reserved_separator")),
        [byte] if byte.is_ascii() => Ok(()),
        _ => Err(ValidationError::new("separator_not_single_ascii_char")),
    }
}

/// Validate file path (basic check for valid path characters)
pub fn validate_file_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::new("empty_file_path"));
    }

    let invalid_chars = ['<', '>', '"', '|', '?', '*'];
    if path.chars().any(|c| invalid_chars.contains(&c)) {
        return Err(ValidationError::new("invalid_file_path_characters"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_color() {
        assert!(validate_hex_color("#FFFFFF").is_ok());
        assert!(validate_hex_color("#1f77b4").is_ok());

        assert!(validate_hex_color("FFFFFF").is_err()); // Missing #
        assert!(validate_hex_color("#FFF").is_err());
        assert!(validate_hex_color("#GGGGGG").is_err());
        assert!(validate_hex_color("").is_err());
    }

    #[test]
    fn test_language_code() {
        assert!(validate_language_code("de").is_ok());
        assert!(validate_language_code("als").is_ok());
        assert!(validate_language_code("zh-min-nan").is_ok());

        assert!(validate_language_code("DE").is_err());
        assert!(validate_language_code("d").is_err());
        assert!(validate_language_code("de.wikipedia").is_err());
    }

    #[test]
    fn test_log_level() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("WARN").is_ok());
        assert!(validate_log_level("info,wikimetrix_api=trace").is_ok());

        assert!(validate_log_level("").is_err());
        assert!(validate_log_level("verbose").is_err());
    }

    #[test]
    fn test_separator() {
        assert!(validate_separator("\t").is_ok());
        assert!(validate_separator(",").is_ok());
        assert!(validate_separator(";").is_ok());

        assert!(validate_separator("").is_err());
        assert!(validate_separator(",,").is_err());
        assert!(validate_separator("\"").is_err());
        assert!(validate_separator("§").is_err());
    }

    #[test]
    fn test_validate_file_path() {
        assert!(validate_file_path("./out").is_ok());
        assert!(validate_file_path("/tmp/results").is_ok());

        assert!(validate_file_path("").is_err());
        assert!(validate_file_path("out|put").is_err());
    }
}
