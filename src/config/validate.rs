// src/config/validate.rs

use std::time::Duration;

use regex::Regex;

use crate::config::model::{RawSettingsFile, Settings};
use crate::errors::{BuildtailError, Result};

impl TryFrom<RawSettingsFile> for Settings {
    type Error = BuildtailError;

    fn try_from(raw: RawSettingsFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_settings(&raw)?;
        let completion_pattern = compile_completion_pattern(&raw.session.completion_pattern)?;
        Ok(Settings::new_unchecked(
            Duration::from_millis(raw.session.poll_interval_ms),
            completion_pattern,
            Duration::from_secs(raw.cleanup.timeout_secs),
            Duration::from_millis(raw.cleanup.retry_interval_ms),
        ))
    }
}

impl Settings {
    /// Apply CLI flag overrides on top of file/default settings,
    /// re-checking the same invariants as the file validation.
    pub fn with_overrides(
        mut self,
        poll_interval_ms: Option<u64>,
        cleanup_timeout_secs: Option<u64>,
    ) -> Result<Self> {
        if let Some(ms) = poll_interval_ms {
            ensure_nonzero("--poll-interval-ms", ms)?;
            self.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = cleanup_timeout_secs {
            ensure_nonzero("--cleanup-timeout-secs", secs)?;
            self.cleanup_timeout = Duration::from_secs(secs);
        }
        ensure_retry_fits(self.cleanup_retry_interval, self.cleanup_timeout)?;
        Ok(self)
    }
}

fn validate_raw_settings(raw: &RawSettingsFile) -> Result<()> {
    ensure_nonzero("[session].poll_interval_ms", raw.session.poll_interval_ms)?;
    ensure_nonzero("[cleanup].timeout_secs", raw.cleanup.timeout_secs)?;
    ensure_nonzero("[cleanup].retry_interval_ms", raw.cleanup.retry_interval_ms)?;
    ensure_retry_fits(
        Duration::from_millis(raw.cleanup.retry_interval_ms),
        Duration::from_secs(raw.cleanup.timeout_secs),
    )?;

    if raw.session.completion_pattern.trim().is_empty() {
        return Err(BuildtailError::ConfigError(
            "[session].completion_pattern must not be empty".to_string(),
        ));
    }

    Ok(())
}

/// Compile a completion pattern, rejecting ones that match the empty log.
///
/// A pattern that matches empty text would end every session before the
/// build tool has written anything.
pub fn compile_completion_pattern(pattern: &str) -> Result<Regex> {
    let re = Regex::new(pattern)?;
    if re.is_match("") {
        return Err(BuildtailError::ConfigError(format!(
            "completion pattern {pattern:?} matches an empty log"
        )));
    }
    Ok(re)
}

fn ensure_nonzero(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(BuildtailError::ConfigError(format!(
            "{field} must be >= 1 (got 0)"
        )));
    }
    Ok(())
}

fn ensure_retry_fits(retry_interval: Duration, timeout: Duration) -> Result<()> {
    if retry_interval > timeout {
        return Err(BuildtailError::ConfigError(format!(
            "[cleanup].retry_interval_ms ({} ms) exceeds the cleanup timeout ({} ms)",
            retry_interval.as_millis(),
            timeout.as_millis()
        )));
    }
    Ok(())
}
