// src/config/options.rs

//! Per-invocation options and the immutable build session derived from them.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::cli::CliArgs;
use crate::errors::{BuildtailError, Result};

/// Build tool flag that names the log file.
pub const OUT_FLAG: &str = "/out";

/// Options extracted from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Path to the build executable.
    pub executable: PathBuf,
    /// Arguments for the build executable, exactly as given.
    pub studio_args: Vec<String>,
    /// Log file named by `/out <file>`, if any.
    pub out_file: Option<PathBuf>,
    /// Whether `/out` appeared at all.
    pub out_file_specified: bool,
    /// Keep an implicitly created log file after the session.
    pub keep_log: bool,
}

impl SessionOptions {
    /// Extract options from parsed CLI arguments.
    ///
    /// The first `/out` token marks the log file as caller-requested and the
    /// token after it is taken as its path.
    pub fn from_cli(args: &CliArgs) -> Result<Self> {
        Self::from_parts(args.studio_path.clone(), args.studio_args.clone(), args.keep_log)
    }

    pub fn from_parts(
        executable: PathBuf,
        studio_args: Vec<String>,
        keep_log: bool,
    ) -> Result<Self> {
        let out_pos = studio_args.iter().position(|a| a == OUT_FLAG);
        let out_file_specified = out_pos.is_some();
        let out_file = out_pos
            .and_then(|pos| studio_args.get(pos + 1))
            .map(PathBuf::from);

        if out_file_specified && out_file.is_none() {
            return Err(BuildtailError::ConfigError(format!(
                "the \"{OUT_FLAG}\" argument should be followed by a valid file path"
            )));
        }

        Ok(Self {
            executable,
            studio_args,
            out_file,
            out_file_specified,
            keep_log,
        })
    }
}

/// One supervised build: what to run and where its log goes.
///
/// Created once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSession {
    executable: PathBuf,
    args: Vec<String>,
    output_path: PathBuf,
    output_requested: bool,
    keep_output: bool,
}

impl BuildSession {
    /// Resolve the log file for `options`, creating a temporary one when the
    /// caller did not name one, and append `/out <path>` for the child in
    /// that case.
    pub fn prepare(options: SessionOptions) -> Result<Self> {
        match options.out_file {
            Some(path) => Ok(Self::new(
                options.executable,
                options.studio_args,
                path,
                true,
                options.keep_log,
            )),
            None => {
                let path = create_temp_log_path()?;
                Ok(Self::with_generated_output(
                    options.executable,
                    options.studio_args,
                    path,
                    options.keep_log,
                ))
            }
        }
    }

    /// Session whose log path was chosen by the caller via `/out`.
    pub fn new(
        executable: PathBuf,
        args: Vec<String>,
        output_path: PathBuf,
        output_requested: bool,
        keep_output: bool,
    ) -> Self {
        Self {
            executable,
            args,
            output_path,
            output_requested,
            keep_output,
        }
    }

    /// Session writing to a generated path; `/out <path>` is appended to the
    /// child's arguments.
    pub fn with_generated_output(
        executable: PathBuf,
        mut args: Vec<String>,
        output_path: PathBuf,
        keep_output: bool,
    ) -> Self {
        args.push(OUT_FLAG.to_string());
        args.push(output_path.to_string_lossy().into_owned());
        Self::new(executable, args, output_path, false, keep_output)
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Arguments joined the way the build tool sees them on its command line.
    pub fn argument_string(&self) -> String {
        self.args.join(" ")
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn output_requested(&self) -> bool {
        self.output_requested
    }

    /// Whether the log file is deleted after the session.
    pub fn removes_output(&self) -> bool {
        !self.output_requested && !self.keep_output
    }
}

fn create_temp_log_path() -> Result<PathBuf> {
    let file = tempfile::Builder::new()
        .prefix("buildtail-")
        .suffix(".log")
        .tempfile()
        .context("creating temporary build log")?;

    let path = file
        .into_temp_path()
        .keep()
        .context("persisting temporary build log path")?;

    Ok(path)
}
