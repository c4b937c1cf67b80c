use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn doctor_lists_paths_and_env_overrides() {
    let tmp = tempdir().expect("tempdir");
    let primary = tmp.path().join("migrations");
    fs::create_dir_all(&primary).expect("mkdir primary");

    assert_cmd::cargo::cargo_bin_cmd!("remig")
        .current_dir(tmp.path())
        .env("REMIG_PRIMARY_DIR", &primary)
        .arg("doctor")
        .assert()
        .success()
        .stdout(predicate::str::contains("primary_dir="))
        .stdout(predicate::str::contains("env REMIG_PRIMARY_DIR="))
        .stdout(predicate::str::contains("env REMIG_EPOCH unset"));
}

#[test]
fn doctor_fails_when_primary_dir_is_missing() {
    let tmp = tempdir().expect("tempdir");

    assert_cmd::cargo::cargo_bin_cmd!("remig")
        .current_dir(tmp.path())
        .env("REMIG_PRIMARY_DIR", tmp.path().join("absent"))
        .arg("doctor")
        .assert()
        .failure()
        .stderr(predicate::str::contains("primary migrations dir missing"));
}
