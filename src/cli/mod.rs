//! CLI interface and argument parsing

pub mod commands;

use crate::config::CcdaConfig;
use clap::{Parser, Subcommand};

/// ccda-export - C-CDA clinical document exporter
#[derive(Parser, Debug)]
#[command(name = "ccda-export")]
#[command(version, about, long_about = None)]
#[command(author = "ccda-export Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ccda-export.toml", env = "CCDA_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CCDA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Log level to start with
    ///
    /// `--log-level` (or `CCDA_LOG_LEVEL`) wins, then `application.log_level`
    /// from a loaded config file, then `info`.
    pub fn effective_log_level<'a>(&'a self, config: Option<&'a CcdaConfig>) -> &'a str {
        self.log_level
            .as_deref()
            .or_else(|| config.map(|c| c.application.log_level.as_str()))
            .unwrap_or("info")
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one patient's CCD from the database
    Export(commands::export::ExportArgs),

    /// Render a CCD from a JSON patient snapshot
    Render(commands::render::RenderArgs),

    /// Run the HTTP export endpoint
    Serve(commands::serve::ServeArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
