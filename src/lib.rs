// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod tail;
pub mod types;

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::cli::CliArgs;
use crate::config::{load_settings, BuildSession, SessionOptions};
use crate::engine::SessionRuntime;
use crate::exec::RealProcessLauncher;
use crate::fs::RealFileSystem;
use crate::types::SessionReport;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings loading (file + CLI overrides)
/// - the build session (log path, child arguments)
/// - the session runtime with the real launcher, filesystem and stdout
///
/// User-facing messages from the report are written to stderr; stdout only
/// ever carries the mirrored build log.
pub async fn run(args: CliArgs) -> Result<SessionReport> {
    let settings = load_settings(args.config.as_deref())?
        .with_overrides(args.poll_interval_ms, args.cleanup_timeout_secs)?;
    debug!(?settings, "settings resolved");

    let options = SessionOptions::from_cli(&args)?;
    let session = BuildSession::prepare(options)?;

    let runtime = SessionRuntime::new(
        session,
        settings,
        Arc::new(RealFileSystem),
        RealProcessLauncher,
        std::io::stdout(),
    );

    let report = runtime.run().await?;
    debug!(?report, "session report");

    for message in report.user_messages() {
        eprintln!("{message}");
    }

    Ok(report)
}
