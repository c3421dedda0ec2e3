//! wiki-metrix - Main Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};

use wikimetrix_api::WikiClient;
use wikimetrix_cli::{client_config, run, Cli};
use wikimetrix_common::init_logging;
use wikimetrix_config::ConfigLoader;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    // Keep the guard alive so file logs are flushed on exit
    let _guard = init_logging(config.logging.to_logging_config())?;

    info!("Starting wiki-metrix {}", env!("CARGO_PKG_VERSION"));
    debug!(?config, "Configuration loaded");

    let client = WikiClient::new(client_config(&config.api)).context("Failed to build HTTP client")?;

    run(&cli.command, &config, &client, !cli.quiet).await
}
