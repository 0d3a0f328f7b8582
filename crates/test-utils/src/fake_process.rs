use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use buildtail::errors::{BuildtailError, Result};
use buildtail::exec::{BuildProcess, ProcessLauncher};
use buildtail::fs::FileSystem;
use buildtail::fs::mock::MockFileSystem;

/// One step of a scripted build tool, performed on a liveness poll.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    /// Append bytes to the log and keep running.
    Append(Vec<u8>),
    /// Do nothing this poll.
    Idle,
    /// Append bytes and exit with the code in the same poll.
    AppendThenExit(Vec<u8>, i32),
    /// Exit with the code.
    Exit(i32),
}

impl ScriptStep {
    pub fn append(text: &str) -> Self {
        ScriptStep::Append(text.as_bytes().to_vec())
    }
}

/// A fake build tool that replays a script against a `MockFileSystem`.
///
/// Each `is_alive` call performs the next step. Once the script runs out the
/// process keeps "running" forever, like a tool that lingers after logging
/// its summary.
pub struct FakeBuildProcess {
    fs: MockFileSystem,
    log_path: PathBuf,
    steps: VecDeque<ScriptStep>,
    exit_code: Option<i32>,
    polls: Arc<Mutex<usize>>,
}

impl BuildProcess for FakeBuildProcess {
    fn is_alive(&mut self) -> bool {
        *self.polls.lock().unwrap() += 1;

        if self.exit_code.is_some() {
            return false;
        }

        match self.steps.pop_front() {
            Some(ScriptStep::Append(bytes)) => {
                self.fs.append(&self.log_path, bytes);
                true
            }
            Some(ScriptStep::Idle) | None => true,
            Some(ScriptStep::AppendThenExit(bytes, code)) => {
                self.fs.append(&self.log_path, bytes);
                self.exit_code = Some(code);
                false
            }
            Some(ScriptStep::Exit(code)) => {
                self.exit_code = Some(code);
                false
            }
        }
    }

    fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

/// What the fake launcher saw when `start` was called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRecord {
    pub executable: PathBuf,
    pub args: Vec<String>,
    /// Whether the log file already existed (i.e. the tail handle was open).
    pub log_existed: bool,
}

/// Launcher handing out a single scripted `FakeBuildProcess`.
pub struct FakeLauncher {
    fs: MockFileSystem,
    log_path: PathBuf,
    script: Option<Vec<ScriptStep>>,
    launches: Arc<Mutex<Vec<LaunchRecord>>>,
    polls: Arc<Mutex<usize>>,
}

impl FakeLauncher {
    pub fn new(fs: MockFileSystem, log_path: impl AsRef<Path>, script: Vec<ScriptStep>) -> Self {
        Self {
            fs,
            log_path: log_path.as_ref().to_path_buf(),
            script: Some(script),
            launches: Arc::new(Mutex::new(Vec::new())),
            polls: Arc::new(Mutex::new(0)),
        }
    }

    /// A launcher whose `start` always fails, like a missing executable.
    pub fn failing(fs: MockFileSystem, log_path: impl AsRef<Path>) -> Self {
        Self {
            script: None,
            ..Self::new(fs, log_path, Vec::new())
        }
    }

    /// Shared view of every launch attempt.
    pub fn launches(&self) -> Arc<Mutex<Vec<LaunchRecord>>> {
        Arc::clone(&self.launches)
    }

    /// Shared count of liveness polls.
    pub fn polls(&self) -> Arc<Mutex<usize>> {
        Arc::clone(&self.polls)
    }
}

impl ProcessLauncher for FakeLauncher {
    fn start(&mut self, executable: &Path, args: &[String]) -> Result<Box<dyn BuildProcess>> {
        self.launches.lock().unwrap().push(LaunchRecord {
            executable: executable.to_path_buf(),
            args: args.to_vec(),
            log_existed: self.fs.exists(&self.log_path),
        });

        let Some(script) = self.script.take() else {
            return Err(BuildtailError::LaunchFailure {
                executable: executable.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "program not found",
                ),
            });
        };

        Ok(Box::new(FakeBuildProcess {
            fs: self.fs.clone(),
            log_path: self.log_path.clone(),
            steps: script.into(),
            exit_code: None,
            polls: Arc::clone(&self.polls),
        }))
    }
}
