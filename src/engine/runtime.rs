// src/engine/runtime.rs

use std::fmt;
use std::future::Future;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::{BuildSession, Settings};
use crate::errors::Result;
use crate::exec::ProcessLauncher;
use crate::fs::FileSystem;
use crate::tail::LogTailReader;
use crate::types::{CleanupStatus, SessionOutcome, SessionReport};

use super::cleanup::{CleanupReport, CleanupRetrier};
use super::core::SessionCore;
use super::Observation;

/// Drives one build session: opens the log, launches the build tool, polls
/// both until the core reports a finish, then removes the log if asked to.
///
/// This is the IO shell around `SessionCore`, which holds the session
/// semantics. Everything runs on one task; the loop never waits on the
/// child or on file growth, only on its poll interval.
pub struct SessionRuntime<L: ProcessLauncher, W: Write> {
    session: BuildSession,
    settings: Settings,
    fs: Arc<dyn FileSystem>,
    launcher: L,
    echo: W,
}

impl<L: ProcessLauncher, W: Write> fmt::Debug for SessionRuntime<L, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionRuntime")
            .field("session", &self.session)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<L: ProcessLauncher, W: Write> SessionRuntime<L, W> {
    pub fn new(
        session: BuildSession,
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        launcher: L,
        echo: W,
    ) -> Self {
        Self {
            session,
            settings,
            fs,
            launcher,
            echo,
        }
    }

    /// Run the session, treating Ctrl-C as an interruption.
    pub async fn run(self) -> Result<SessionReport> {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
        })
        .await
    }

    /// Run the session; `interrupt` resolving ends supervision early.
    ///
    /// Errors are returned only for failures before the build tool is
    /// launched (preparing or opening the log). A launch failure, an
    /// abnormal exit and a failed cleanup are all reported in the returned
    /// [`SessionReport`].
    pub async fn run_until<F>(self, interrupt: F) -> Result<SessionReport>
    where
        F: Future<Output = ()>,
    {
        let Self {
            session,
            settings,
            fs,
            mut launcher,
            echo,
        } = self;

        let path = session.output_path().to_path_buf();
        info!(
            executable = ?session.executable(),
            args = %session.argument_string(),
            log = ?path,
            "starting build session"
        );

        // Start from an empty log so an old summary cannot end this session.
        fs.prepare_empty(&path)
            .with_context(|| format!("clearing previous build log {path:?}"))?;

        // The log handle must exist before the child so no write is missed.
        let mut reader = LogTailReader::open(fs.as_ref(), &path)?;

        let mut core = SessionCore::new(
            settings.completion_pattern.clone(),
            echo,
            session.removes_output(),
        );

        let mut child = match launcher.start(session.executable(), session.args()) {
            Ok(child) => child,
            Err(e) => {
                warn!(error = %e, "build tool could not be launched");
                core.launch_failed(e.to_string());
                drop(reader);
                let cleanup = discard_unused_log(fs.as_ref(), &session);
                return Ok(SessionReport {
                    outcome: session_outcome(&core),
                    exit_code: None,
                    bytes_mirrored: 0,
                    cleanup,
                });
            }
        };

        core.launched();
        tokio::pin!(interrupt);

        loop {
            // Drain first, then look at the child, so output written right
            // before an exit is never skipped.
            let text = reader.read_available();
            if !text.is_empty() && core.observe(Observation::LogText(text)).is_finished() {
                break;
            }

            if !child.is_alive() {
                let code = child.exit_code().unwrap_or(-1);
                if code != 0 {
                    // The child is gone; whatever it wrote is all there is.
                    let tail = reader.drain();
                    if !tail.is_empty()
                        && core.observe(Observation::LogText(tail)).is_finished()
                    {
                        break;
                    }
                }
                if core.observe(Observation::ChildExited(code)).is_finished() {
                    break;
                }
            }

            tokio::select! {
                _ = sleep(settings.poll_interval) => {}
                _ = &mut interrupt => {
                    core.observe(Observation::Interrupted);
                    break;
                }
            }
        }

        core.mirror_trailing(&reader.finish());
        let bytes_mirrored = reader.bytes_read();
        // Release our handle before trying to delete the file.
        drop(reader);

        let outcome = session_outcome(&core);
        info!(%outcome, bytes_mirrored, "build session finished");

        let cleanup = if core.begin_cleanup() {
            let retrier =
                CleanupRetrier::new(settings.cleanup_timeout, settings.cleanup_retry_interval);
            let status = remove_log(&retrier, fs.as_ref(), &path).await;
            core.cleanup_finished();
            status
        } else {
            debug!(log = ?path, "keeping build log");
            CleanupStatus::Kept
        };

        Ok(SessionReport {
            outcome,
            exit_code: child.exit_code(),
            bytes_mirrored,
            cleanup,
        })
    }
}

fn session_outcome<W: Write>(core: &SessionCore<W>) -> SessionOutcome {
    core.outcome()
        .cloned()
        .unwrap_or(SessionOutcome::Interrupted)
}

async fn remove_log(retrier: &CleanupRetrier, fs: &dyn FileSystem, path: &Path) -> CleanupStatus {
    match retrier.remove_with_retry(fs, path).await {
        Ok(CleanupReport::Removed { attempts }) => CleanupStatus::Removed { attempts },
        Ok(CleanupReport::AlreadyAbsent) => CleanupStatus::AlreadyAbsent,
        Err(e) => CleanupStatus::Failed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    }
}

/// Nothing but us ever held the log when the launch failed, so a single
/// attempt is enough.
fn discard_unused_log(fs: &dyn FileSystem, session: &BuildSession) -> CleanupStatus {
    if !session.removes_output() {
        return CleanupStatus::Kept;
    }

    let path = session.output_path();
    match fs.remove_file(path) {
        Ok(()) => CleanupStatus::Removed { attempts: 1 },
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => CleanupStatus::AlreadyAbsent,
        Err(e) => {
            debug!(log = ?path, error = %e, "could not remove unused build log");
            CleanupStatus::Failed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }
}
