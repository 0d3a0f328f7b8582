// src/config/mod.rs

//! Configuration for buildtail.
//!
//! Responsibilities:
//! - Define the TOML-backed settings model (`model.rs`).
//! - Load a settings file from disk (`loader.rs`).
//! - Validate intervals and the completion pattern (`validate.rs`).
//! - Turn CLI arguments into a `BuildSession` (`options.rs`).

pub mod loader;
pub mod model;
pub mod options;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, load_settings};
pub use model::{
    CleanupSection, RawSettingsFile, SessionSection, Settings, DEFAULT_COMPLETION_PATTERN,
};
pub use options::{BuildSession, SessionOptions, OUT_FLAG};
pub use validate::compile_completion_pattern;
