//! Where tables and plots are written

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use wikimetrix_common::{with_context, Result};
use wikimetrix_config::Config;
use wikimetrix_stats::Table;

/// Relative paths are taken relative to the configured output directory
pub fn resolve_output_path(path: &Path, config: &Config) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        Path::new(&config.output.directory).join(path)
    }
}

/// Plot path with the configured format's extension appended when it has none
pub fn resolve_plot_path(path: &Path, config: &Config) -> PathBuf {
    let path = resolve_output_path(path, config);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(config.graph.format.extension())
    }
}

/// Write `table` to `path`, or to stdout when there is none
pub fn write_table(table: &Table, path: Option<&Path>, config: &Config) -> Result<()> {
    let separator = config.separator_byte();
    match path {
        Some(path) => {
            let path = resolve_output_path(path, config);
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .map_err(|e| with_context!(e, "Failed to create output directory {}", parent.display()))?;
            }
            let file = File::create(&path)
                .map_err(|e| with_context!(e, "Failed to create output file {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            table.write_delimited(&mut writer, separator)?;
            writer.flush()?;
            info!("Wrote {} rows to {}", table.len(), path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            table.write_delimited(&mut writer, separator)?;
            writer.flush()?;
        }
    }
    Ok(())
}
