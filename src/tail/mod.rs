// src/tail/mod.rs

//! Tailing of the build tool's log file.
//!
//! - [`reader`] pulls newly appended text from a file another process is
//!   still writing, without ever waiting for it.
//! - [`detector`] mirrors that text to the console and decides, from the
//!   text alone, when the build has finished.

pub mod detector;
pub mod reader;

pub use detector::CompletionDetector;
pub use reader::{LogTailReader, MAX_READ_PER_POLL};
