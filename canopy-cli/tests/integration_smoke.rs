//! Smoke tests to verify command module wiring

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_serve_help() {
    let mut cmd = Command::cargo_bin("canopy").unwrap();
    cmd.arg("serve").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Address to bind to"));
}

#[test]
fn test_db_migrate_help() {
    let mut cmd = Command::cargo_bin("canopy").unwrap();
    cmd.arg("db").arg("migrate").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Create tables and indexes"));
}

#[test]
fn test_db_seed_help() {
    let mut cmd = Command::cargo_bin("canopy").unwrap();
    cmd.arg("db").arg("seed").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Remove the starter dataset"));
}

#[test]
fn test_missing_database_url_fails() {
    let mut cmd = Command::cargo_bin("canopy").unwrap();
    cmd.arg("db").arg("migrate").env_remove("DATABASE_URL");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("DATABASE_URL not set"));
}
