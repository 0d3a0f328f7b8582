#![allow(dead_code)]

use std::path::PathBuf;

use buildtail::config::{
    BuildSession, CleanupSection, RawSettingsFile, SessionOptions, SessionSection, Settings,
};

/// Builder for `Settings` to simplify test setup.
///
/// Defaults favour fast tests: 1 ms polling, 1 s cleanup budget.
pub struct SettingsBuilder {
    raw: RawSettingsFile,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawSettingsFile {
                session: SessionSection {
                    poll_interval_ms: 1,
                    ..SessionSection::default()
                },
                cleanup: CleanupSection {
                    timeout_secs: 1,
                    retry_interval_ms: 10,
                },
            },
        }
    }

    pub fn poll_interval_ms(mut self, ms: u64) -> Self {
        self.raw.session.poll_interval_ms = ms;
        self
    }

    pub fn completion_pattern(mut self, pattern: &str) -> Self {
        self.raw.session.completion_pattern = pattern.to_string();
        self
    }

    pub fn cleanup_timeout_secs(mut self, secs: u64) -> Self {
        self.raw.cleanup.timeout_secs = secs;
        self
    }

    pub fn cleanup_retry_interval_ms(mut self, ms: u64) -> Self {
        self.raw.cleanup.retry_interval_ms = ms;
        self
    }

    pub fn build(self) -> Settings {
        Settings::try_from(self.raw).expect("Failed to build valid settings from builder")
    }
}

impl Default for SettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `SessionOptions` / `BuildSession`.
pub struct SessionOptionsBuilder {
    executable: PathBuf,
    args: Vec<String>,
    keep_log: bool,
}

impl SessionOptionsBuilder {
    pub fn new(executable: &str) -> Self {
        Self {
            executable: PathBuf::from(executable),
            args: Vec::new(),
            keep_log: false,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    /// Add `/out <path>`, making the log caller-requested.
    pub fn out(self, path: &str) -> Self {
        self.arg("/out").arg(path)
    }

    pub fn keep_log(mut self, val: bool) -> Self {
        self.keep_log = val;
        self
    }

    pub fn build(self) -> SessionOptions {
        SessionOptions::from_parts(self.executable, self.args, self.keep_log)
            .expect("Failed to build valid session options from builder")
    }

    /// A session whose log lives at `generated_log`, as if it were a
    /// temporary file created by buildtail (unless `/out` was given).
    pub fn build_session(self, generated_log: &str) -> BuildSession {
        let options = self.build();
        match options.out_file {
            Some(path) => BuildSession::new(
                options.executable,
                options.studio_args,
                path,
                true,
                options.keep_log,
            ),
            None => BuildSession::with_generated_output(
                options.executable,
                options.studio_args,
                PathBuf::from(generated_log),
                options.keep_log,
            ),
        }
    }
}
