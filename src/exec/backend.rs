// src/exec/backend.rs

//! Pluggable process launcher abstraction.
//!
//! The session runtime talks to a `ProcessLauncher` instead of spawning
//! `tokio::process::Command` directly. Production uses
//! [`RealProcessLauncher`]; session tests provide a scripted launcher whose
//! "process" writes to a mock log file and exits when told to.

use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::info;

use crate::errors::{BuildtailError, Result};

use super::child::{BuildProcess, ChildHandle};

/// Trait abstracting how the build tool is started.
pub trait ProcessLauncher {
    /// Start `executable` with `args`, passed through unchanged.
    ///
    /// Fails with [`BuildtailError::LaunchFailure`] if the process cannot be
    /// spawned. There is no retry.
    fn start(&mut self, executable: &Path, args: &[String]) -> Result<Box<dyn BuildProcess>>;
}

/// Spawns real OS processes.
#[derive(Debug, Clone, Default)]
pub struct RealProcessLauncher;

impl ProcessLauncher for RealProcessLauncher {
    fn start(&mut self, executable: &Path, args: &[String]) -> Result<Box<dyn BuildProcess>> {
        info!(executable = ?executable, args = %args.join(" "), "starting build tool");

        // The tool writes to its log file, not to us; let it share our
        // console for anything else it prints or prompts for. It is not
        // killed on drop: it may still be finishing up after its banner.
        let child = Command::new(executable)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(false)
            .spawn()
            .map_err(|source| BuildtailError::LaunchFailure {
                executable: executable.to_path_buf(),
                source,
            })?;

        info!(pid = ?child.id(), "build tool started");
        Ok(Box::new(ChildHandle::new(child)))
    }
}
