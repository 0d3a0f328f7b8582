// src/engine/mod.rs

//! Orchestration engine for a build session.
//!
//! This module ties together:
//! - the log tail reader and completion detector
//! - the launched build tool
//! - cleanup of the log file afterwards
//!
//! The pure state machine lives in [`core`]; the async/IO shell that polls
//! the file and the process is implemented in [`runtime`]; deadline-bounded
//! log removal is in [`cleanup`].

/// Something the runtime saw while the session was `Running`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observation {
    /// Text newly appended to the build log.
    LogText(String),
    /// The build tool exited with this code.
    ChildExited(i32),
    /// The user asked to stop supervising (Ctrl-C).
    Interrupted,
}

pub mod cleanup;
pub mod core;
pub mod runtime;

pub use cleanup::{classify_remove_error, CleanupReport, CleanupRetrier, RemoveFailure};
pub use self::core::SessionCore;
pub use runtime::SessionRuntime;
pub use crate::types::{CleanupStatus, SessionOutcome, SessionReport, SessionState};
