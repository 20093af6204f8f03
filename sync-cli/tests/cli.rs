//! End-to-end tests for the `pairsync` binary: two devices sharing one
//! substrate directory.

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::tempdir;

fn pairsync(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("pairsync").unwrap();
    cmd.arg("--data-dir").arg(data_dir).env_remove("RUST_LOG");
    cmd
}

fn init(data_dir: &Path, name: &str, substrate: &Path) {
    pairsync(data_dir)
        .args(["init", "--name", name, "--substrate"])
        .arg(substrate)
        .assert()
        .success()
        .stdout(predicate::str::contains("Device initialized successfully!"));
}

// ===========================================
// Setup Tests
// ===========================================

#[test]
fn help_lists_commands() {
    Command::cargo_bin("pairsync")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn commands_require_init() {
    let dir = tempdir().unwrap();

    pairsync(dir.path())
        .args(["fetch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pairsync init"));
}

#[test]
fn init_twice_fails() {
    let dir = tempdir().unwrap();
    let shared = dir.path().join("shared");
    init(&dir.path().join("phone"), "Phone", &shared);

    pairsync(&dir.path().join("phone"))
        .args(["init", "--name", "Again", "--substrate"])
        .arg(&shared)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_unknown_peer_selection() {
    let dir = tempdir().unwrap();

    pairsync(dir.path())
        .args(["init", "--name", "Phone", "--substrate", "shared"])
        .args(["--peer-selection", "random"])
        .assert()
        .failure();
}

// ===========================================
// Publish / Fetch Tests
// ===========================================

#[test]
fn publish_without_fields_fails() {
    let dir = tempdir().unwrap();
    init(dir.path(), "Phone", &dir.path().join("shared"));

    pairsync(dir.path())
        .arg("publish")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to publish"));
}

#[test]
fn fetch_before_publish_prints_empty() {
    let dir = tempdir().unwrap();
    init(dir.path(), "Phone", &dir.path().join("shared"));

    pairsync(dir.path())
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("(empty)"));
}

#[test]
fn watch_fetches_phone_weather() {
    let dir = tempdir().unwrap();
    let shared = dir.path().join("shared");
    let phone = dir.path().join("phone");
    let watch = dir.path().join("watch");
    init(&phone, "Phone", &shared);
    init(&watch, "Watch", &shared);

    pairsync(&phone)
        .args(["publish", "--weather-id", "200", "--high", "75", "--low", "-5.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Publish successful!"));

    // Nothing mirrored locally before the peer fetch
    pairsync(&watch)
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("(empty)"));

    pairsync(&watch)
        .args(["fetch", "--peer", "--timeout-secs", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("weatherId=200"))
        .stdout(predicate::str::contains("lowTemp=-5.5"));

    // Write-through left a local copy
    pairsync(&watch)
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("highTemp=75.0"));
}

#[test]
fn partial_publish_merges() {
    let dir = tempdir().unwrap();
    init(dir.path(), "Phone", &dir.path().join("shared"));

    pairsync(dir.path())
        .args(["publish", "--weather-id", "1", "--high", "80", "--low", "60"])
        .assert()
        .success();
    pairsync(dir.path())
        .args(["publish", "--high", "85"])
        .assert()
        .success();

    pairsync(dir.path())
        .arg("fetch")
        .assert()
        .success()
        .stdout(predicate::str::contains("highTemp=85.0"))
        .stdout(predicate::str::contains("lowTemp=60.0"))
        .stdout(predicate::str::contains("weatherId=1"));
}

#[test]
fn status_shows_peer() {
    let dir = tempdir().unwrap();
    let shared = dir.path().join("shared");
    let phone = dir.path().join("phone");
    init(&phone, "Phone", &shared);
    init(&dir.path().join("watch"), "Watch", &shared);

    // The watch registers on its first command
    pairsync(&dir.path().join("watch"))
        .arg("fetch")
        .assert()
        .success();

    pairsync(&phone)
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 connected"))
        .stdout(predicate::str::contains("Watch"));
}
