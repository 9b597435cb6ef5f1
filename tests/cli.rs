//! Integration tests for the glowstore CLI.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper to create a glowstore Command
fn glowstore() -> Command {
    cargo_bin_cmd!("glowstore")
}

fn temp_db(dir: &TempDir) -> String {
    dir.path().join("store.db").to_string_lossy().into_owned()
}

#[test]
fn test_help() {
    glowstore().arg("--help").assert().success();
}

#[test]
fn test_version() {
    glowstore().arg("--version").assert().success();
}

#[test]
fn test_init_db_creates_database_file() {
    let dir = TempDir::new().unwrap();
    let db = temp_db(&dir);

    glowstore()
        .args(["--db", &db, "init-db"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Database ready"));

    assert!(dir.path().join("store.db").exists());
}

#[test]
fn test_seed_populates_catalog() {
    let dir = TempDir::new().unwrap();
    let db = temp_db(&dir);

    glowstore()
        .args(["--db", &db, "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created admin account"))
        .stdout(predicate::str::contains("starter products"));
}

#[test]
fn test_seed_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let db = temp_db(&dir);

    glowstore().args(["--db", &db, "seed"]).assert().success();

    glowstore()
        .args(["--db", &db, "seed"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"))
        .stdout(predicate::str::contains("skipping catalog seed"));
}
