#![allow(dead_code)]

pub use buildtail_test_utils::init_tracing;

/// Summary line as Atmel Studio prints it.
pub const BANNER: &str =
    "========== Build: 3 succeeded or up-to-date, 0 failed, 1 skipped ==========";

/// A log ending in the banner, the way the build tool finishes a log.
pub fn finished_log() -> String {
    format!("------ Build started: Project: blink, Configuration: Debug AVR ------\n{BANNER}\n")
}
