//! Runs the built binary through paths that fail before ping is started.

use std::fs;
use std::process::{Command, Output};

fn pingpy(args: &[&str]) -> Output {
    pingpy_with_env(&[], args)
}

fn pingpy_with_env(vars: &[(&str, &str)], args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pingpy"))
        .args(args)
        .env_remove("PINGPY_COUNT")
        .env_remove("PINGPY_SLEEP")
        .env_remove("PINGPY_LOG_FILE")
        .env_remove("RUST_LOG")
        .envs(vars.iter().copied())
        .output()
        .expect("failed to run pingpy")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn missing_target_is_a_usage_error() {
    let out = pingpy(&[]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn overwrite_and_append_together_are_refused() {
    let out = pingpy(&["-f", "x.log", "-o", "-a", "localhost"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn zero_sleep_is_refused() {
    let out = pingpy(&["-s", "0", "localhost"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("interval"), "{}", stderr(&out));
}

#[test]
fn target_with_shell_characters_is_refused() {
    let out = pingpy(&["local;host"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("forbidden character"), "{}", stderr(&out));
}

#[test]
fn existing_log_without_mode_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ping.log");
    fs::write(&path, "keep me\n").unwrap();

    let out = pingpy(&["-f", path.to_str().unwrap(), "localhost"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("already exists"), "{}", stderr(&out));
    assert_eq!(fs::read_to_string(&path).unwrap(), "keep me\n");
}

#[test]
fn log_in_missing_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ping.log");

    let out = pingpy(&["-f", path.to_str().unwrap(), "-o", "localhost"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("cannot open log file"), "{}", stderr(&out));
    assert!(!path.exists());
}

#[test]
fn log_file_from_env_satisfies_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ping.log");

    // gets past clap's `-a requires -f` and fails later, opening the log
    let out = pingpy_with_env(&[("PINGPY_LOG_FILE", path.to_str().unwrap())], &["-a", "localhost"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("cannot open log file"), "{}", stderr(&out));
}

#[test]
fn zero_sleep_from_env_is_refused() {
    let out = pingpy_with_env(&[("PINGPY_SLEEP", "0")], &["localhost"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("interval"), "{}", stderr(&out));
}

#[cfg(target_os = "linux")]
#[test]
fn count_and_sleep_from_env_reach_the_command() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("ping.log");

    let out = pingpy_with_env(
        &[
            ("PINGPY_COUNT", "7"),
            ("PINGPY_SLEEP", "0.5"),
            ("PINGPY_LOG_FILE", path.to_str().unwrap()),
        ],
        &["-v", "-o", "localhost"],
    );
    assert_eq!(out.status.code(), Some(2));
    assert!(stderr(&out).contains("ping -c 7 -i 0.5 localhost"), "{}", stderr(&out));
}
