// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cliprobe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cliprobe",
    version,
    about = "Run the CLI under test with resolved configuration and a time budget.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the properties store.
    ///
    /// Default: `CLIPROBE_CONFIG`, else `config.properties` in the current
    /// working directory. A missing store is not an error.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// API host passed to the CLI; overrides `appknox.api.host`.
    #[arg(long, value_name = "URL")]
    pub host: Option<String>,

    /// Access token passed to the CLI; overrides `appknox.access.token`.
    #[arg(long, value_name = "TOKEN")]
    pub token: Option<String>,

    /// Run without host/token in the overlay.
    #[arg(long, conflicts_with_all = ["host", "token"])]
    pub no_auth: bool,

    /// Execution budget in seconds; overrides `command.timeout`.
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Print the full result as JSON instead of the raw output.
    #[arg(long)]
    pub json: bool,

    /// Resolve everything and print the invocation, but don't run it.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CLIPROBE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Subcommand of the CLI under test (e.g. `whoami`).
    #[arg(value_name = "SUBCOMMAND")]
    pub subcommand: String,

    /// Arguments passed through verbatim after the subcommand.
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
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
