//! CLI end-to-end tests that invoke the compiled `pages` binary.
//!
//! Network-backed commands are exercised only up to their fail-fast
//! paths: every repository command must refuse to run without a stored
//! identity, before touching disk or network.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Run `pages` with $HOME pointed at an isolated temp directory so the
/// tests never read or write a real credential file.
fn pages(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pages").unwrap();
    cmd.env("HOME", home.path());
    cmd.env_remove("PAGES_MANAGER_TOKEN");
    cmd
}

#[test]
fn test_help_exits_zero_and_lists_commands() {
    let home = TempDir::new().unwrap();
    pages(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("cname"));
}

#[test]
fn test_no_command_prints_hint() {
    let home = TempDir::new().unwrap();
    pages(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("pages --help"));
}

#[test]
fn test_pull_fails_fast_without_identity() {
    let home = TempDir::new().unwrap();
    pages(&home)
        .arg("pull")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_deploy_fails_fast_without_identity() {
    let home = TempDir::new().unwrap();
    pages(&home)
        .args(["deploy", "blog"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_without_identity_is_a_no_op() {
    let home = TempDir::new().unwrap();
    pages(&home)
        .args(["logout", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_deploy_requires_target() {
    let home = TempDir::new().unwrap();
    // Argument validation happens before the identity check
    pages(&home)
        .args(["deploy", "blog", "--all"])
        .assert()
        .failure();
}
