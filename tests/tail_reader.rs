// tests/tail_reader.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs::OpenOptions;
use std::io::Write;
use std::time::{Duration, Instant};

use buildtail::fs::mock::MockFileSystem;
use buildtail::fs::{FileSystem, RealFileSystem};
use buildtail::tail::{LogTailReader, MAX_READ_PER_POLL};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn open_creates_missing_file() -> TestResult {
    init_tracing();

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");
    assert!(!path.exists());

    let mut reader = LogTailReader::open(&RealFileSystem, &path)?;
    assert!(path.exists());
    assert_eq!(reader.read_available(), "");
    Ok(())
}

#[test]
fn reads_only_new_text_while_a_writer_appends() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");

    let mut reader = LogTailReader::open(&RealFileSystem, &path)?;
    let mut writer = OpenOptions::new().append(true).open(&path)?;

    writer.write_all(b"first line\n")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "first line\n");
    assert_eq!(reader.read_available(), "");

    writer.write_all(b"second ")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "second ");

    writer.write_all(b"line\n")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "line\n");

    assert_eq!(reader.bytes_read(), "first line\nsecond line\n".len() as u64);
    Ok(())
}

#[test]
fn read_available_returns_promptly_on_an_idle_file() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");
    let mut reader = LogTailReader::open(&RealFileSystem, &path)?;

    let started = Instant::now();
    for _ in 0..100 {
        assert_eq!(reader.read_available(), "");
    }
    assert!(started.elapsed() < Duration::from_secs(1));
    Ok(())
}

#[test]
fn holds_back_a_split_utf8_sequence_until_complete() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");
    let mut reader = LogTailReader::open(&RealFileSystem, &path)?;
    let mut writer = OpenOptions::new().append(true).open(&path)?;

    // "é" is 0xC3 0xA9.
    writer.write_all(b"caf\xC3")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "caf");

    writer.write_all(b"\xA9!\n")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "é!\n");
    Ok(())
}

#[test]
fn invalid_bytes_become_replacement_characters() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");
    let mut reader = LogTailReader::open(&RealFileSystem, &path)?;
    let mut writer = OpenOptions::new().append(true).open(&path)?;

    writer.write_all(b"ok \xFF ok\n")?;
    writer.flush()?;
    assert_eq!(reader.read_available(), "ok \u{FFFD} ok\n");
    Ok(())
}

#[test]
fn finish_flushes_an_incomplete_trailing_sequence() -> TestResult {
    let fs = MockFileSystem::new();
    let mut reader = LogTailReader::open(&fs, "build.log".as_ref())?;

    fs.append("build.log", b"tail\xE2\x82");
    assert_eq!(reader.read_available(), "tail");
    assert_eq!(reader.finish(), "\u{FFFD}");
    assert_eq!(reader.finish(), "");
    Ok(())
}

#[test]
fn transient_read_failures_look_like_no_data() -> TestResult {
    let fs = MockFileSystem::new();
    let mut reader = LogTailReader::open(&fs, "build.log".as_ref())?;

    fs.append("build.log", "hello\n");
    fs.fail_next_reads("build.log", 2);

    assert_eq!(reader.read_available(), "");
    assert_eq!(reader.read_available(), "");
    assert_eq!(reader.read_available(), "hello\n");
    Ok(())
}

#[test]
fn preexisting_content_is_read_from_the_start() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file("build.log", "already here\n");

    let mut reader = LogTailReader::open(&fs, "build.log".as_ref())?;
    assert_eq!(reader.read_available(), "already here\n");
    Ok(())
}

#[test]
fn prepare_empty_removes_a_stale_log_and_tolerates_absence() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("build.log");
    std::fs::write(&path, "old summary\n")?;

    RealFileSystem.prepare_empty(&path)?;
    assert!(!path.exists());
    RealFileSystem.prepare_empty(&path)?;
    Ok(())
}

#[test]
fn read_available_is_capped_but_drain_takes_everything() -> TestResult {
    let fs = MockFileSystem::new();
    let mut reader = LogTailReader::open(&fs, "build.log".as_ref())?;

    fs.append("build.log", "a".repeat(2 * MAX_READ_PER_POLL + 10));
    assert_eq!(reader.read_available().len(), MAX_READ_PER_POLL);
    assert_eq!(reader.drain().len(), MAX_READ_PER_POLL + 10);
    assert_eq!(reader.drain(), "");
    Ok(())
}

#[test]
fn finish_completes_a_sequence_split_by_the_read_cap() -> TestResult {
    let fs = MockFileSystem::new();
    let mut reader = LogTailReader::open(&fs, "build.log".as_ref())?;

    // The cap falls between the two bytes of "é".
    let mut log = "a".repeat(MAX_READ_PER_POLL - 1).into_bytes();
    log.extend_from_slice("é tail\n".as_bytes());
    fs.append("build.log", &log);

    let mut text = reader.read_available();
    assert_eq!(text.len(), MAX_READ_PER_POLL - 1);
    text.push_str(&reader.finish());

    assert!(!text.contains('\u{FFFD}'));
    assert!(text.ends_with("é tail\n"));
    assert_eq!(reader.bytes_read(), log.len() as u64);
    Ok(())
}
