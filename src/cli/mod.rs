//! Command-line interface for itdgen.
//!
//! # Commands
//!
//! - `generate` - compute every trigger-matched identifier and render the aspects
//! - `graph` - print the metadata dependency tree of each physical type
//! - `inspect` - parse a metadata identifier and show its parts
//!
//! # Global Options
//!
//! - `--verbose` / `-v` - debug logging
//! - `--quiet` / `-q` - no logging or progress lines
//! - `--config` / `-c` - global configuration file (default `~/.itdgen/config.toml`)
//! - `--project` / `-p` - project file (default `itdgen.toml`)
//!
//! # Examples
//!
//! ```bash
//! itdgen generate --output .
//! itdgen --project demo/itdgen.toml graph --type com.example.Customer
//! itdgen inspect 'MID:JavaBean#SRC_MAIN_JAVA?com.example.Customer'
//! ```

mod common;
mod generate;
mod graph;
mod inspect;

pub use common::{Computed, Workspace};
pub use generate::aspect_path;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::DEFAULT_PROJECT_FILE;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// `tracing` filter directive, `None` for no logging.
    pub log_level: Option<String>,

    /// Suppress progress lines.
    pub quiet: bool,

    /// Explicit global configuration file.
    pub config_path: Option<PathBuf>,
}

/// Main CLI structure for itdgen.
#[derive(Parser, Debug)]
#[command(
    name = "itdgen",
    about = "Generate inter-type declarations from annotated Java types",
    version,
    long_about = "itdgen computes JavaBean and data-on-demand aspects for the types described in \
                  itdgen.toml, recomputing only what a change actually affects."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Path to the global configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Path to the project file
    #[arg(short, long, global = true, value_name = "PATH", default_value = DEFAULT_PROJECT_FILE)]
    project: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render aspect files for the project
    Generate(generate::GenerateCommand),

    /// Show the metadata dependency tree
    Graph(graph::GraphCommand),

    /// Parse a metadata identifier
    Inspect(inspect::InspectCommand),
}

impl Cli {
    /// Execute the parsed command.
    ///
    /// # Errors
    ///
    /// Returns whatever error the command produced.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Derive the runtime settings from the global flags.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            quiet: self.quiet,
            config_path: self.config.clone(),
        }
    }

    /// Execute with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns whatever error the command produced.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        match self.command {
            Commands::Generate(cmd) => cmd.execute(&config, &self.project).await,
            Commands::Graph(cmd) => cmd.execute(&config, &self.project).await,
            Commands::Inspect(cmd) => cmd.execute(),
        }
    }
}
