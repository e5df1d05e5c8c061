// Tests for command-line usage errors

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_missing_process_argument_is_usage_error() {
    Command::cargo_bin("handleit")
        .unwrap()
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_extra_arguments_are_usage_error() {
    Command::cargo_bin("handleit")
        .unwrap()
        .args(["explorer.exe", "notepad.exe"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("handleit")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}
