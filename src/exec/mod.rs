// src/exec/mod.rs

//! Process execution layer.
//!
//! This module starts the build tool with `tokio::process::Command` and
//! exposes its liveness and exit code for polling.
//!
//! - [`backend`] provides the `ProcessLauncher` trait and the concrete
//!   `RealProcessLauncher` used in production, which tests replace with a
//!   scripted fake.
//! - [`child`] wraps a spawned child behind the non-blocking
//!   `BuildProcess` trait.

pub mod backend;
pub mod child;

pub use backend::{ProcessLauncher, RealProcessLauncher};
pub use child::{BuildProcess, ChildHandle};
