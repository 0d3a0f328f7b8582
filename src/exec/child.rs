// src/exec/child.rs

//! Liveness polling for a launched build tool.

use tokio::process::Child;
use tracing::{info, warn};

/// A running (or exited) build tool, observed without blocking.
pub trait BuildProcess: Send {
    /// Whether the process is still running. Never waits for it to exit.
    fn is_alive(&mut self) -> bool;

    /// Exit code once the process has been observed to exit.
    ///
    /// A process terminated by a signal reports `-1`.
    fn exit_code(&self) -> Option<i32>;
}

/// [`BuildProcess`] over a `tokio::process::Child`.
#[derive(Debug)]
pub struct ChildHandle {
    child: Child,
    exit_code: Option<i32>,
}

impl ChildHandle {
    pub fn new(child: Child) -> Self {
        Self {
            child,
            exit_code: None,
        }
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

impl BuildProcess for ChildHandle {
    fn is_alive(&mut self) -> bool {
        if self.exit_code.is_some() {
            return false;
        }

        match self.child.try_wait() {
            Ok(Some(status)) => {
                let code = status.code().unwrap_or(-1);
                info!(exit_code = code, success = status.success(), "build tool exited");
                self.exit_code = Some(code);
                false
            }
            Ok(None) => true,
            Err(e) => {
                // Cannot tell; assume it is still running and ask again next poll.
                warn!(error = %e, "failed to query build tool status");
                true
            }
        }
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}
