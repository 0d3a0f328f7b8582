// src/logging.rs

//! Diagnostics for `buildtail` via `tracing` + `tracing-subscriber`.
//!
//! The level comes from `--log-level`, then `BUILDTAIL_LOG`, then `warn`.
//! Diagnostics always go to stderr: stdout is reserved for the mirrored
//! build log so CI captures it as if the build tool had printed it.

use std::io::IsTerminal;
use std::str::FromStr;

use anyhow::Result;
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

/// Environment variable consulted when no `--log-level` flag is given.
pub const LOG_ENV_VAR: &str = "BUILDTAIL_LOG";

const DEFAULT_LEVEL: Level = Level::WARN;

/// Install the global subscriber. Call once, before the session starts.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_value.as_deref());

    let stderr = std::io::stderr();
    fmt()
        .with_max_level(level)
        .with_target(level >= Level::DEBUG)
        .with_ansi(stderr.is_terminal())
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

/// Pick the effective level. An unparsable environment value is ignored.
pub fn resolve_level(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Level {
    cli_level
        .map(Level::from)
        .or_else(|| env_value.and_then(parse_level_str))
        .unwrap_or(DEFAULT_LEVEL)
}

/// Parse a level name as accepted by `BUILDTAIL_LOG`.
pub fn parse_level_str(s: &str) -> Option<Level> {
    match s.trim().to_ascii_lowercase().as_str() {
        "warning" => Some(Level::WARN),
        other => Level::from_str(other).ok(),
    }
}

impl From<LogLevel> for Level {
    fn from(lvl: LogLevel) -> Self {
        match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}
