use std::fmt;
use std::path::PathBuf;

/// Lifecycle of one supervised build session.
///
/// `Starting → Running → Finished → CleaningUp → Done`; a launch failure goes
/// straight from `Starting` to `Done`, and `CleaningUp` is skipped when the
/// log file is to be kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Running,
    Finished { success: bool },
    CleaningUp,
    Done,
}

impl SessionState {
    pub fn is_finished(self) -> bool {
        !matches!(self, SessionState::Starting | SessionState::Running)
    }
}

/// How the supervised part of a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The completion banner appeared in the log.
    Completed,
    /// The build tool exited non-zero before printing the banner.
    AbnormalExit { code: i32 },
    /// Supervision was interrupted (Ctrl-C) before the banner appeared.
    Interrupted,
    /// The build tool could not be started.
    LaunchFailed { message: String },
}

impl SessionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SessionOutcome::Completed)
    }
}

/// What happened to the log file after the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupStatus {
    /// The caller asked for the file (`/out` or `--keep-log`).
    Kept,
    Removed { attempts: u32 },
    /// Nothing to delete.
    AlreadyAbsent,
    /// Deletion did not succeed within the retry budget.
    Failed { path: PathBuf, reason: String },
}

/// Summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Exit code of the build tool, if it had exited when supervision ended.
    pub exit_code: Option<i32>,
    /// Bytes read from the log and mirrored to the console.
    pub bytes_mirrored: u64,
    pub cleanup: CleanupStatus,
}

impl SessionReport {
    /// Exit code for `buildtail` itself.
    pub fn process_exit_code(&self) -> i32 {
        if self.outcome.is_success() { 0 } else { 1 }
    }

    /// Messages for the user, one per line, in the order they should appear.
    pub fn user_messages(&self) -> Vec<String> {
        let mut messages = Vec::new();

        match &self.outcome {
            SessionOutcome::Completed => {}
            SessionOutcome::AbnormalExit { code } => messages.push(format!(
                "The build tool exited with code {code} before reporting a build summary."
            )),
            SessionOutcome::Interrupted => {
                messages.push("Interrupted before the build reported a summary.".to_string())
            }
            SessionOutcome::LaunchFailed { message } => messages.push(message.clone()),
        }

        if let CleanupStatus::Failed { path, .. } = &self.cleanup {
            messages.push(format!(
                "A temporary file was created but could not be deleted. Location:\n\t{}",
                path.display()
            ));
        }

        messages
    }
}

impl fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionOutcome::Completed => write!(f, "completed"),
            SessionOutcome::AbnormalExit { code } => write!(f, "exited with code {code}"),
            SessionOutcome::Interrupted => write!(f, "interrupted"),
            SessionOutcome::LaunchFailed { message } => write!(f, "launch failed: {message}"),
        }
    }
}
