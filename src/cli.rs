// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `rnapipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rnapipe",
    version,
    about = "Run the RNA-seq QC + differential-expression pipeline over a sample manifest.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Rnapipe.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value = "Rnapipe.toml")]
    pub config: String,

    /// Maximum number of concurrently running tasks.
    ///
    /// Overrides `[pipeline].jobs`; defaults to the number of available
    /// processing units.
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RNAPIPE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the task DAG, but don't execute anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
