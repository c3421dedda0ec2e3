//! Loading configuration files from disk

use std::io::Write;
use wikimetrix_common::{LogFormat, Project};
use wikimetrix_config::{ConfigLoader, GraphFormat};

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() {
    let file = config_file(
        r##"
[site]
lang = "de"

[graph]
format = "svg"
primary_color = "#AA3300"

[logging]
format = "json"
"##,
    );

    let config = ConfigLoader::load_from_file(file.path()).unwrap();

    assert_eq!(config.project(), Project::new("de", "wikipedia"));
    assert_eq!(config.graph.format, GraphFormat::Svg);
    assert_eq!(config.graph.primary_color, "#AA3300");
    assert_eq!(config.graph.width, 1200);
    assert_eq!(config.selection.input_column, "article");
    assert_eq!(config.separator_byte(), b'\t');

    let logging = config.logging.to_logging_config();
    assert_eq!(logging.format, LogFormat::Json);
    assert!(logging.file_path.is_none());
}

#[test]
fn invalid_values_are_reported_as_configuration_errors() {
    let file = config_file("[output]\nseparator = \";;\"\n");

    let error = ConfigLoader::load_from_file(file.path()).unwrap_err();
    assert!(error.to_string().starts_with("Configuration error"));
}
