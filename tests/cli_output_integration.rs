use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::tempdir;

fn taskflow(root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("taskflow"));
    cmd.current_dir(root)
        .env("NO_COLOR", "1")
        .env("TASKFLOW_USER", "dana")
        .env_remove("TASKFLOW_DB");
    cmd
}

fn init(root: &Path) {
    taskflow(root)
        .arg("init")
        .assert()
        .success()
        .stderr(contains("Initialized"));
}

#[test]
fn json_errors_carry_stable_codes() {
    let dir = tempdir().unwrap();
    taskflow(dir.path())
        .args(["stack", "list"])
        .assert()
        .failure()
        .code(1)
        .stderr(contains(r#""error":"not_initialized""#));

    init(dir.path());
    taskflow(dir.path())
        .args(["stack", "show", "zz"])
        .assert()
        .failure()
        .stderr(contains(r#""error":"invalid_id""#));
    taskflow(dir.path())
        .args(["stack", "create", "   "])
        .assert()
        .failure()
        .stderr(contains(r#""error":"empty_title""#));
}

#[test]
fn pretty_errors_are_plain_text() {
    let dir = tempdir().unwrap();
    init(dir.path());
    taskflow(dir.path())
        .args(["--pretty", "task", "show", "abc"])
        .assert()
        .failure()
        .stderr(contains("error: task abc not found"));
}

#[test]
fn pretty_and_minimal_stack_output() {
    let dir = tempdir().unwrap();
    init(dir.path());
    taskflow(dir.path())
        .args(["--format", "pretty", "stack", "create", "Weekend"])
        .assert()
        .success()
        .stdout(contains("Weekend").and(contains("active")).and(contains("0/0 done")));

    taskflow(dir.path())
        .args(["--format", "minimal", "stack", "list"])
        .assert()
        .success()
        .stdout(contains("TITLE").and(contains("Weekend")));
}

#[test]
fn second_init_is_rejected() {
    let dir = tempdir().unwrap();
    init(dir.path());
    taskflow(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(contains("already_initialized"));
}

#[test]
fn feeds_need_api_keys() {
    let dir = tempdir().unwrap();
    taskflow(dir.path())
        .env_remove("NEWS_API_KEY")
        .arg("news")
        .assert()
        .failure()
        .stderr(contains(r#""error":"missing_api_key""#).and(contains("NEWS_API_KEY")));

    taskflow(dir.path())
        .env("OPENWEATHER_API_KEY", "k")
        .args(["weather", "--lat", "12.5"])
        .assert()
        .failure()
        .stderr(contains(r#""error":"missing_argument""#));
}
