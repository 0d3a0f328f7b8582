// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildtailError {
    /// The build tool could not be spawned. Fatal to the session.
    #[error("failed to launch {executable:?}: {source}")]
    LaunchFailure {
        executable: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The log file outlived the cleanup budget. Never fatal.
    #[error("could not delete {path:?}: {reason}")]
    CleanupFailure { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid completion pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildtailError>;
