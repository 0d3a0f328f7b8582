// src/engine/core.rs

//! Pure session state machine.
//!
//! `SessionCore` consumes [`Observation`]s and tracks the session's
//! [`SessionState`]. It has no channels, no Tokio types, and performs no IO
//! beyond echoing log text through its detector's sink, so it can be unit
//! tested without processes or files.
//!
//! The async shell (`engine::runtime::SessionRuntime`) is responsible for:
//! - reading the log and polling the child
//! - sleeping between iterations
//! - running cleanup

use std::io::Write;

use regex::Regex;
use tracing::{debug, info};

use crate::engine::Observation;
use crate::tail::CompletionDetector;
use crate::types::{SessionOutcome, SessionState};

#[derive(Debug)]
pub struct SessionCore<W: Write> {
    detector: CompletionDetector<W>,
    state: SessionState,
    outcome: Option<SessionOutcome>,
    removes_output: bool,
    zero_exit_seen: bool,
}

impl<W: Write> SessionCore<W> {
    /// `removes_output` decides whether `Finished` leads to `CleaningUp`.
    pub fn new(pattern: Regex, echo: W, removes_output: bool) -> Self {
        Self {
            detector: CompletionDetector::new(pattern, echo),
            state: SessionState::Starting,
            outcome: None,
            removes_output,
            zero_exit_seen: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    pub fn detector(&self) -> &CompletionDetector<W> {
        &self.detector
    }

    pub fn into_detector(self) -> CompletionDetector<W> {
        self.detector
    }

    /// Log handle opened and child started: `Starting → Running`.
    pub fn launched(&mut self) {
        if self.state == SessionState::Starting {
            self.state = SessionState::Running;
        }
    }

    /// Child could not be started: `Starting → Done`.
    pub fn launch_failed(&mut self, message: String) {
        if self.state == SessionState::Starting {
            self.outcome = Some(SessionOutcome::LaunchFailed { message });
            self.state = SessionState::Done;
        }
    }

    /// Feed one observation taken while `Running`.
    ///
    /// Observations arriving in any other state are ignored.
    pub fn observe(&mut self, observation: Observation) -> SessionState {
        if self.state != SessionState::Running {
            debug!(state = ?self.state, ?observation, "ignoring observation outside Running");
            return self.state;
        }

        match observation {
            Observation::LogText(text) => {
                self.detector.consume(&text);
                if self.detector.is_complete() {
                    info!("build summary banner detected");
                    self.finish(SessionOutcome::Completed);
                }
            }
            Observation::ChildExited(0) => {
                // The tool may hand its work to another process that keeps
                // writing the log, so a clean exit is not the end.
                if !self.zero_exit_seen {
                    info!("build tool exited cleanly without a summary; still watching the log");
                    self.zero_exit_seen = true;
                }
            }
            Observation::ChildExited(code) => {
                info!(exit_code = code, "build tool exited abnormally before its summary");
                self.finish(SessionOutcome::AbnormalExit { code });
            }
            Observation::Interrupted => {
                info!("session interrupted");
                self.finish(SessionOutcome::Interrupted);
            }
        }

        self.state
    }

    /// Mirror text read after the session finished (e.g. a trailing newline
    /// after the banner) without affecting the state.
    pub fn mirror_trailing(&mut self, text: &str) {
        self.detector.consume(text);
    }

    /// `Finished → CleaningUp` when the log is to be removed, otherwise
    /// `Finished → Done`. Returns whether cleanup should run.
    pub fn begin_cleanup(&mut self) -> bool {
        if !matches!(self.state, SessionState::Finished { .. }) {
            return false;
        }
        if self.removes_output {
            self.state = SessionState::CleaningUp;
            true
        } else {
            self.state = SessionState::Done;
            false
        }
    }

    /// `CleaningUp → Done`.
    pub fn cleanup_finished(&mut self) {
        if self.state == SessionState::CleaningUp {
            self.state = SessionState::Done;
        }
    }

    fn finish(&mut self, outcome: SessionOutcome) {
        let success = outcome.is_success();
        self.outcome = Some(outcome);
        self.state = SessionState::Finished { success };
    }
}
