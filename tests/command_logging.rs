//! End-to-end coverage of command runs that log to destination files.

use std::fs;
use std::sync::Arc;

use satchel::clock::FixedClock;
use satchel::command::{Command, RunContext, RunError};
use satchel::exit::ExitRequest;
use satchel::SatchelError;
use tempfile::tempdir;

// 2019-01-17T06:00:37 UTC.
const EPOCH: i64 = 1_547_704_837;
const STAMP: &str = "2019-01-17T06:00:37";

fn fake_command(run: impl Fn(&mut RunContext<'_>) -> Result<(), RunError> + 'static) -> Command {
    Command::new("fake", "fake", run).with_clock(Arc::new(FixedClock::at_epoch(EPOCH)))
}

#[test]
fn test_log_command_success() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        Ok(())
    });
    let code = cmd.main(["--log", log_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 0);
    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents.trim_end(), format!("{STAMP} fake"));
}

#[test]
fn test_log_command_error() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        Err(ExitRequest::new(1).into())
    });
    let code = cmd.main(["--log", log_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 1);
    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.starts_with(&format!("{STAMP} fake")));
}

#[test]
fn test_log_file_command_error() {
    let dir = tempdir().unwrap();
    let log_file_path = dir.path().join("log_file");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        Err(ExitRequest::new(1).into())
    });
    let code = cmd.main(["--log-file", log_file_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 1);
    let contents = fs::read_to_string(&log_file_path).unwrap();
    assert!(contents.starts_with(&format!("{STAMP} fake")));
}

#[test]
fn test_unicode_messages() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    // Byte-string and decoded-text messages must both log without faulting,
    // and equal characters must produce equal lines.
    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info(&b"bytes here \xE9"[..]);
        ctx.log.info(&b"unicode here \xC3\xA9"[..]);
        ctx.log.info("unicode here é");
        Ok(())
    });
    let code = cmd.main(["--log", log_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 0);
    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], lines[2]);
    assert_eq!(lines[1], format!("{STAMP} unicode here é"));
}

#[test]
fn test_fault_maps_to_internal_error_and_is_recorded() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        let fault = std::io::Error::new(std::io::ErrorKind::Other, "backend unavailable");
        Err(SatchelError::other(fault).into())
    });
    let code = cmd.main(["--log", log_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 2);
    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.starts_with(&format!("{STAMP} fake")));
    assert!(contents.contains("backend unavailable"));
}

#[test]
fn test_log_and_log_file_thresholds_differ() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");
    let log_file_path = dir.path().join("log_file");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.debug("noisy detail");
        ctx.log.info("fake");
        Ok(())
    });
    let code = cmd.main([
        "--log",
        log_path.to_str().unwrap(),
        "--log-file",
        log_file_path.to_str().unwrap(),
        "-qqq",
    ]);

    assert_eq!(code, 0);
    let info_log = fs::read_to_string(&log_path).unwrap();
    assert_eq!(info_log.trim_end(), format!("{STAMP} fake"));

    let verbose_log = fs::read_to_string(&log_file_path).unwrap();
    assert!(verbose_log.contains("noisy detail"));
    assert!(verbose_log.contains("fake"));
}

#[test]
fn test_version_check_suppression_flag_parses() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        Ok(())
    });
    let code = cmd.main([
        "--log",
        log_path.to_str().unwrap(),
        "--no-version-check",
        "-qqq",
    ]);

    assert_eq!(code, 0);
}

#[test]
fn test_upgrade_hint_lands_in_destination_on_success() {
    let cache_dir = tempdir().unwrap();
    fs::write(
        cache_dir.path().join("selfcheck.json"),
        r#"{"last_check": "2019-01-16T00:00:00Z", "latest_version": "99.0.0"}"#,
    )
    .unwrap();
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info("fake");
        Ok(())
    });
    let code = cmd.main([
        "--log",
        log_path.to_str().unwrap(),
        "--cache-dir",
        cache_dir.path().to_str().unwrap(),
        "-qqq",
    ]);

    assert_eq!(code, 0);
    let contents = fs::read_to_string(&log_path).unwrap();
    assert!(contents.contains("version 99.0.0 is available"));
}

#[test]
fn test_positional_args_reach_the_run_step() {
    let dir = tempdir().unwrap();
    let log_path = dir.path().join("log");

    let cmd = fake_command(|ctx: &mut RunContext<'_>| {
        ctx.log.info(format!("args: {}", ctx.args.join(",")));
        Ok(())
    });
    let code = cmd.main(["alpha", "beta", "--log", log_path.to_str().unwrap(), "-qqq"]);

    assert_eq!(code, 0);
    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents.trim_end(), format!("{STAMP} args: alpha,beta"));
}
