// src/engine/cleanup.rs

//! Deadline-bounded removal of the build log.
//!
//! The build tool can keep its log open for a short while after the session
//! is logically over. Removal is attempted until it succeeds or the time
//! budget runs out.

use std::io;
use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::errors::{BuildtailError, Result};
use crate::fs::FileSystem;

/// Successful result of [`CleanupRetrier::remove_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupReport {
    Removed { attempts: u32 },
    /// The file did not exist (any more).
    AlreadyAbsent,
}

/// Classification of a failed removal attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveFailure {
    /// Another process still holds the file; try again later.
    Retryable,
    /// Not a lock conflict (permissions, bad path, ...). Still retried, and
    /// reported in preference to lock conflicts when the budget runs out.
    Terminal,
}

/// Classify a removal error.
pub fn classify_remove_error(err: &io::Error) -> RemoveFailure {
    if is_sharing_violation(err) {
        return RemoveFailure::Retryable;
    }
    match err.kind() {
        io::ErrorKind::ResourceBusy | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            RemoveFailure::Retryable
        }
        _ => RemoveFailure::Terminal,
    }
}

#[cfg(windows)]
fn is_sharing_violation(err: &io::Error) -> bool {
    const ERROR_SHARING_VIOLATION: i32 = 32;
    const ERROR_LOCK_VIOLATION: i32 = 33;
    matches!(
        err.raw_os_error(),
        Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
    )
}

#[cfg(not(windows))]
fn is_sharing_violation(_err: &io::Error) -> bool {
    false
}

/// Retry policy for deleting the log file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupRetrier {
    timeout: Duration,
    retry_interval: Duration,
}

impl CleanupRetrier {
    pub fn new(timeout: Duration, retry_interval: Duration) -> Self {
        Self {
            timeout,
            retry_interval,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Delete `path`, retrying every failed attempt while less than
    /// `timeout` has elapsed. At least one attempt is always made.
    ///
    /// Lock conflicts are expected and only logged at debug. Other failures
    /// are retried too (a file pending deletion or held by a scanner reports
    /// access denied for a moment) and the latest one is reported if the
    /// budget runs out.
    ///
    /// Returns [`BuildtailError::CleanupFailure`] once the budget is spent.
    pub async fn remove_with_retry(
        &self,
        fs: &dyn FileSystem,
        path: &Path,
    ) -> Result<CleanupReport> {
        let started = Instant::now();
        let mut attempts: u32 = 0;
        // Latest non-lock failure, reported if the budget runs out.
        let mut terminal: Option<String> = None;

        loop {
            attempts += 1;

            let err = match fs.remove_file(path) {
                Ok(()) => {
                    info!(path = ?path, attempts, "removed build log");
                    return Ok(CleanupReport::Removed { attempts });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    debug!(path = ?path, attempts, "build log already gone");
                    return Ok(CleanupReport::AlreadyAbsent);
                }
                Err(e) => e,
            };

            match classify_remove_error(&err) {
                RemoveFailure::Retryable => {
                    debug!(path = ?path, attempts, error = %err, "build log in use; retrying");
                }
                RemoveFailure::Terminal => {
                    if terminal.is_none() {
                        info!(path = ?path, attempts, error = %err, "cannot remove build log yet");
                    }
                    terminal = Some(err.to_string());
                }
            }

            let elapsed = started.elapsed();
            if elapsed >= self.timeout {
                let reason = terminal.unwrap_or_else(|| {
                    format!("still in use after {:.1}s: {err}", elapsed.as_secs_f64())
                });
                warn!(
                    path = ?path,
                    attempts,
                    elapsed_ms = elapsed.as_millis() as u64,
                    %reason,
                    "giving up on removing build log"
                );
                return Err(BuildtailError::CleanupFailure {
                    path: path.to_path_buf(),
                    reason,
                });
            }

            sleep(self.retry_interval.min(self.timeout - elapsed)).await;
        }
    }
}
