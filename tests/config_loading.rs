// tests/config_loading.rs
mod common;
use crate::common::init_tracing;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use buildtail::cli::CliArgs;
use buildtail::config::{
    load_and_validate, load_from_path, load_settings, BuildSession, RawSettingsFile,
    SessionOptions, Settings, OUT_FLAG,
};
use buildtail::errors::BuildtailError;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<(tempfile::TempDir, PathBuf), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("Buildtail.toml");
    fs::write(&path, contents)?;
    Ok((dir, path))
}

#[test]
fn defaults_match_the_documented_values() {
    init_tracing();

    let settings = Settings::default();
    assert_eq!(settings.poll_interval, Duration::from_millis(50));
    assert_eq!(settings.cleanup_timeout, Duration::from_secs(20));
    assert_eq!(settings.cleanup_retry_interval, Duration::from_millis(100));
    assert!(settings.completion_pattern.is_match(
        "========== Build: 1 succeeded or up-to-date, 0 failed, 0 skipped =========="
    ));
}

#[test]
fn full_settings_file_is_loaded() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[session]
poll_interval_ms = 25
completion_pattern = "^BUILD DONE$"

[cleanup]
timeout_secs = 5
retry_interval_ms = 250
"#,
    )?;

    let settings = load_and_validate(&path)?;
    assert_eq!(settings.poll_interval, Duration::from_millis(25));
    assert_eq!(settings.cleanup_timeout, Duration::from_secs(5));
    assert_eq!(settings.cleanup_retry_interval, Duration::from_millis(250));
    assert!(settings.completion_pattern.is_match("BUILD DONE"));
    Ok(())
}

#[test]
fn missing_sections_and_keys_fall_back_to_defaults() -> TestResult {
    let (_dir, path) = write_config("[cleanup]\ntimeout_secs = 3\n")?;

    let raw: RawSettingsFile = load_from_path(&path)?;
    assert_eq!(raw.cleanup.timeout_secs, 3);
    assert_eq!(raw.cleanup.retry_interval_ms, 100);
    assert_eq!(raw.session.poll_interval_ms, 50);

    let (_dir, empty) = write_config("")?;
    let settings = load_and_validate(&empty)?;
    assert_eq!(settings.poll_interval, Duration::from_millis(50));
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let (_dir, path) = write_config("[session]\npoll_interval = 10\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, BuildtailError::TomlError(_)), "{err}");
    Ok(())
}

#[test]
fn invalid_regex_is_rejected() -> TestResult {
    let (_dir, path) = write_config("[session]\ncompletion_pattern = \"Build: (\"\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, BuildtailError::InvalidPattern(_)), "{err}");
    Ok(())
}

#[test]
fn pattern_matching_an_empty_log_is_rejected() -> TestResult {
    for pattern in ["", ".*", "(Build)?"] {
        let (_dir, path) =
            write_config(&format!("[session]\ncompletion_pattern = \"{pattern}\"\n"))?;
        let err = load_and_validate(&path).unwrap_err();
        assert!(matches!(err, BuildtailError::ConfigError(_)), "{pattern:?}: {err}");
    }
    Ok(())
}

#[test]
fn zero_intervals_are_rejected() -> TestResult {
    let cases = [
        "[session]\npoll_interval_ms = 0\n",
        "[cleanup]\ntimeout_secs = 0\n",
        "[cleanup]\nretry_interval_ms = 0\n",
    ];
    for case in cases {
        let (_dir, path) = write_config(case)?;
        let err = load_and_validate(&path).unwrap_err();
        assert!(matches!(err, BuildtailError::ConfigError(_)), "{case:?}: {err}");
    }
    Ok(())
}

#[test]
fn retry_interval_longer_than_the_budget_is_rejected() -> TestResult {
    let (_dir, path) = write_config("[cleanup]\ntimeout_secs = 1\nretry_interval_ms = 1500\n")?;

    let err = load_and_validate(&path).unwrap_err();
    assert!(err.to_string().contains("exceeds the cleanup timeout"), "{err}");
    Ok(())
}

#[test]
fn explicit_config_path_must_exist() {
    let err = load_settings(Some(Path::new("does/not/exist.toml"))).unwrap_err();
    assert!(matches!(err, BuildtailError::IoError(_)), "{err}");
}

#[test]
fn cli_overrides_replace_file_values() -> TestResult {
    let settings = Settings::default().with_overrides(Some(10), Some(2))?;
    assert_eq!(settings.poll_interval, Duration::from_millis(10));
    assert_eq!(settings.cleanup_timeout, Duration::from_secs(2));

    let untouched = Settings::default().with_overrides(None, None)?;
    assert_eq!(untouched.poll_interval, Duration::from_millis(50));

    assert!(Settings::default().with_overrides(Some(0), None).is_err());
    assert!(Settings::default().with_overrides(None, Some(0)).is_err());
    Ok(())
}

#[test]
fn studio_arguments_are_captured_verbatim() -> TestResult {
    let args = CliArgs::try_parse_from([
        "buildtail",
        "--poll-interval-ms",
        "20",
        "--keep-log",
        "AtmelStudio.exe",
        "blink.atsln",
        "/build",
        "Debug",
        "--not-for-buildtail",
    ])?;

    assert_eq!(args.poll_interval_ms, Some(20));
    assert!(args.keep_log);
    assert_eq!(args.studio_path, PathBuf::from("AtmelStudio.exe"));
    assert_eq!(
        args.studio_args,
        vec!["blink.atsln", "/build", "Debug", "--not-for-buildtail"]
    );

    let options = SessionOptions::from_cli(&args)?;
    assert!(!options.out_file_specified);
    assert_eq!(options.out_file, None);
    Ok(())
}

#[test]
fn studio_path_is_required() {
    assert!(CliArgs::try_parse_from(["buildtail"]).is_err());
}

#[test]
fn out_argument_selects_and_keeps_the_log() -> TestResult {
    let options = SessionOptions::from_parts(
        PathBuf::from("AtmelStudio.exe"),
        vec![
            "blink.atsln".to_string(),
            OUT_FLAG.to_string(),
            "C:\\logs\\blink.log".to_string(),
            "/build".to_string(),
        ],
        false,
    )?;
    assert!(options.out_file_specified);
    assert_eq!(options.out_file, Some(PathBuf::from("C:\\logs\\blink.log")));

    let session = BuildSession::prepare(options)?;
    assert!(session.output_requested());
    assert!(!session.removes_output());
    assert_eq!(session.output_path(), PathBuf::from("C:\\logs\\blink.log"));
    assert_eq!(
        session.argument_string(),
        "blink.atsln /out C:\\logs\\blink.log /build"
    );
    Ok(())
}

#[test]
fn out_argument_without_a_path_is_an_error() {
    let err = SessionOptions::from_parts(
        PathBuf::from("AtmelStudio.exe"),
        vec!["blink.atsln".to_string(), OUT_FLAG.to_string()],
        false,
    )
    .unwrap_err();

    assert!(matches!(err, BuildtailError::ConfigError(_)), "{err}");
    assert!(err.to_string().contains("/out"), "{err}");
}

#[test]
fn missing_out_argument_generates_a_temporary_log() -> TestResult {
    let options =
        SessionOptions::from_parts(PathBuf::from("AtmelStudio.exe"), vec!["blink.atsln".into()], false)?;

    let session = BuildSession::prepare(options)?;
    let path = session.output_path().to_path_buf();

    assert!(!session.output_requested());
    assert!(session.removes_output());
    assert!(path.is_absolute());
    assert!(
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("buildtail-") && n.ends_with(".log")),
        "{path:?}"
    );

    let args = session.args();
    assert_eq!(args[0], "blink.atsln");
    assert_eq!(args[1], OUT_FLAG);
    assert_eq!(args[2], path.to_string_lossy());

    let _ = fs::remove_file(&path);
    Ok(())
}

#[test]
fn keep_log_preserves_a_generated_log() -> TestResult {
    let options = SessionOptions::from_parts(PathBuf::from("AtmelStudio.exe"), Vec::new(), true)?;

    let session = BuildSession::prepare(options)?;
    assert!(!session.removes_output());

    let _ = fs::remove_file(session.output_path());
    Ok(())
}
