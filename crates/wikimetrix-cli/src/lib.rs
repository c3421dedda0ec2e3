//! Command line front end of wiki-metrix
//!
//! The binary only parses arguments, loads configuration and builds the HTTP
//! client; everything else lives here so it can run against any `WikiApi`.

pub mod args;
pub mod commands;
pub mod output;

pub use args::{Cli, Command};
pub use commands::{client_config, graph_config, run};
