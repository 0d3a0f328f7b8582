// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `buildtail`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "buildtail",
    version,
    about = "Run an IDE build tool that logs to a file, and stream that log to the console until the build summary appears.",
    long_about = None,
    after_help = "If you are unsure which arguments to pass to Atmel Studio / Microchip Studio, \
                  launch it from the command line with \"/?\" to see its usage."
)]
pub struct CliArgs {
    /// Path to the settings file (TOML).
    ///
    /// Default: `Buildtail.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BUILDTAIL_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// How often to poll the log file and the build process, in milliseconds.
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// How long to keep retrying deletion of a temporary log file, in seconds.
    #[arg(long, value_name = "SECS")]
    pub cleanup_timeout_secs: Option<u64>,

    /// Keep the temporary log file instead of deleting it after the build.
    #[arg(long)]
    pub keep_log: bool,

    /// Path to the build executable (e.g. AtmelStudio.exe).
    #[arg(value_name = "STUDIO_PATH")]
    pub studio_path: PathBuf,

    /// Arguments passed verbatim to the build executable.
    ///
    /// A `/out <file>` pair here selects the log file and keeps it afterwards.
    #[arg(
        value_name = "STUDIO_ARGS",
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub studio_args: Vec<String>,
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
