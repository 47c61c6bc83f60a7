//! CLI integration tests
//!
//! These stay offline: every case is rejected before the first request.
use predicates::prelude::*;
use tempfile::TempDir;

fn cmd() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("pttcrawl")
}

#[test]
fn test_cli_help() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--board"))
        .stdout(predicate::str::contains("--index <START> <END>"))
        .stdout(predicate::str::contains("--article"))
        .stdout(predicate::str::contains("--skip"));
}

#[test]
fn test_cli_version() {
    cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("pttcrawl"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_cli_requires_board() {
    cmd()
        .args(["-i", "1", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--board"));
}

#[test]
fn test_cli_requires_mode() {
    cmd().args(["-b", "Test"]).assert().failure();
}

#[test]
fn test_cli_index_and_article_conflict() {
    cmd()
        .args(["-b", "Test", "-i", "1", "2", "-a", "M.1409529482.A.9D3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_cli_index_needs_two_values() {
    cmd().args(["-b", "Test", "-i", "1"]).assert().failure();
}

#[test]
fn test_cli_rejects_zero_start() {
    let tmp = TempDir::new().unwrap();

    cmd()
        .args(["-b", "Test", "-i", "0", "2", "-o"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("START must be a positive page index"));

    assert!(std::fs::read_dir(tmp.path()).unwrap().next().is_none());
}

#[test]
fn test_cli_rejects_bad_end() {
    for end in ["0", "-2"] {
        cmd()
            .args(["-b", "Test", "-i", "1", end])
            .assert()
            .failure()
            .stderr(predicate::str::contains("page index must be positive or -1"));
    }
}

#[test]
fn test_cli_rejects_non_numeric_index() {
    cmd()
        .args(["-b", "Test", "-i", "one", "two"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}
