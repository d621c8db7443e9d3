//! Command-line behavior that does not need a browser.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const ADVENT: &str = "\
** game: advent.ulx

* opening
West of House

* inventory
>i
You are empty-handed.

* prologue
>{include} opening
";

fn regtest(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("regtest"));
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1");
    for (key, _) in std::env::vars_os() {
        if key.to_string_lossy().starts_with("REGTEST_") {
            cmd.env_remove(key);
        }
    }
    cmd
}

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("advent.regtest"), ADVENT).unwrap();
    dir
}

#[test]
fn list_prints_tests_in_order() {
    let dir = workspace();
    regtest(&dir)
        .args(["--list", "advent.regtest"])
        .assert()
        .success()
        .stdout("opening\ninventory\nprologue\n");
}

#[test]
fn missing_test_file() {
    let dir = tempfile::tempdir().unwrap();
    regtest(&dir)
        .arg("nope.regtest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"))
        .stderr(predicate::str::contains("nope.regtest"));
}

#[test]
fn missing_interpreter() {
    let dir = workspace();
    regtest(&dir)
        .arg("advent.regtest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field: interpreter"));
}

#[test]
fn missing_explicit_config() {
    let dir = workspace();
    regtest(&dir)
        .args(["--config", "ci.toml", "-i", "parchment/", "advent.regtest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Config file not found"));
}

#[test]
fn invalid_timeout_in_config_file() {
    let dir = workspace();
    fs::write(dir.path().join("regtest.toml"), "timeout = -2\n").unwrap();
    regtest(&dir)
        .args(["-i", "parchment/", "advent.regtest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value for 'timeout'"));
}

#[test]
fn invalid_timeout_from_environment() {
    let dir = workspace();
    regtest(&dir)
        .env("REGTEST_TIMEOUT", "0")
        .args(["-i", "parchment/", "advent.regtest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("timeout"));
}

#[test]
fn interpreter_outside_served_root() {
    let dir = workspace();
    fs::create_dir(dir.path().join("site")).unwrap();
    regtest(&dir)
        .args(["--root", "site", "-p", "0", "-i", "parchment/", "advent.regtest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside"));
}

#[test]
fn pdf_conflicts_with_capture() {
    let dir = workspace();
    regtest(&dir)
        .args(["--pdf", "--capture", "png", "advent.regtest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}
