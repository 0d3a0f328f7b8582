// src/config/model.rs

use std::time::Duration;

use regex::Regex;
use serde::Deserialize;

/// Summary banner Atmel Studio / Microchip Studio prints once a build ends.
pub const DEFAULT_COMPLETION_PATTERN: &str =
    r"========== Build: \d+ succeeded or up-to-date, \d+ failed, \d+ skipped ==========";

/// Default pause between polling iterations.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default budget for deleting a temporary log file the build tool still holds.
pub const DEFAULT_CLEANUP_TIMEOUT_SECS: u64 = 20;

/// Default pause between two deletion attempts.
pub const DEFAULT_CLEANUP_RETRY_INTERVAL_MS: u64 = 100;

/// Settings file as read from TOML, before validation.
///
/// ```toml
/// [session]
/// poll_interval_ms = 50
/// completion_pattern = "========== Build: \\d+ succeeded or up-to-date, \\d+ failed, \\d+ skipped =========="
///
/// [cleanup]
/// timeout_secs = 20
/// retry_interval_ms = 100
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RawSettingsFile {
    #[serde(default)]
    pub session: SessionSection,

    #[serde(default)]
    pub cleanup: CleanupSection,
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSection {
    /// Milliseconds to sleep between "drain log / check child" iterations.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Regex matched against the whole accumulated log to detect completion.
    #[serde(default = "default_completion_pattern")]
    pub completion_pattern: String,
}

fn default_poll_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

fn default_completion_pattern() -> String {
    DEFAULT_COMPLETION_PATTERN.to_string()
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            completion_pattern: default_completion_pattern(),
        }
    }
}

/// `[cleanup]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CleanupSection {
    #[serde(default = "default_cleanup_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_cleanup_retry_interval_ms")]
    pub retry_interval_ms: u64,
}

fn default_cleanup_timeout_secs() -> u64 {
    DEFAULT_CLEANUP_TIMEOUT_SECS
}

fn default_cleanup_retry_interval_ms() -> u64 {
    DEFAULT_CLEANUP_RETRY_INTERVAL_MS
}

impl Default for CleanupSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_cleanup_timeout_secs(),
            retry_interval_ms: default_cleanup_retry_interval_ms(),
        }
    }
}

/// Validated settings used by the session runtime.
///
/// Construct via `Settings::try_from(RawSettingsFile)` (see `validate.rs`),
/// or `Settings::default()`.
#[derive(Debug, Clone)]
pub struct Settings {
    pub poll_interval: Duration,
    pub completion_pattern: Regex,
    pub cleanup_timeout: Duration,
    pub cleanup_retry_interval: Duration,
}

impl Settings {
    /// Build without validation. Callers must uphold the checks in
    /// `validate.rs` themselves.
    pub(crate) fn new_unchecked(
        poll_interval: Duration,
        completion_pattern: Regex,
        cleanup_timeout: Duration,
        cleanup_retry_interval: Duration,
    ) -> Self {
        Self {
            poll_interval,
            completion_pattern,
            cleanup_timeout,
            cleanup_retry_interval,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings::try_from(RawSettingsFile::default())
            .unwrap_or_else(|e| unreachable!("built-in defaults are valid: {e}"))
    }
}
