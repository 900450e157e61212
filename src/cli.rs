// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::dag::SchedulingPolicy;

/// Command-line arguments for `dagsim`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "dagsim",
    version,
    about = "Simulate workflow DAGs on a worker pool and compare scheduling policies.",
    long_about = None
)]
pub struct CliArgs {
    /// Workflow files, or directories searched recursively for `*.toml`.
    #[arg(value_name = "PATH", default_value = "workflows")]
    pub paths: Vec<PathBuf>,

    /// Simulation config (TOML).
    ///
    /// Default: `Dagsim.toml` in the current directory if it exists,
    /// otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Only run these policies (repeatable). Overrides `[simulation].policies`.
    #[arg(long = "policy", value_enum, value_name = "POLICY")]
    pub policies: Vec<SchedulingPolicy>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DAGSIM_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate workflows, print derived task attributes, run nothing.
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
