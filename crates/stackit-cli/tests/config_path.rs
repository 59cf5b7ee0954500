use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn test_config_path_command() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_init_creates_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    assert!(!config_path.exists());

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config at"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("base_url = \"http://localhost:5000\""));
    assert!(contents.contains("[logging]"));
}

#[test]
fn test_config_init_fails_if_exists() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "# existing config").unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_set_base_url_preserves_other_settings() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");

    fs::write(&config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .args(["config", "set-base-url", "https://forum.example.com/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved base URL"));

    let contents = fs::read_to_string(&config_path).unwrap();
    assert!(contents.contains("base_url = \"https://forum.example.com/\""));
    assert!(contents.contains("level = \"debug\""));
}

#[test]
fn test_set_base_url_rejects_garbage() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .args(["config", "set-base-url", "not a url"])
        .assert()
        .failure();

    assert!(!dir.path().join("config.toml").exists());
}

#[test]
fn test_status_reports_configured_server() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("config.toml"),
        "[api]\nbase_url = \"http://forum.internal:8080\"\n",
    )
    .unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .env_remove("STACKIT_BASE_URL")
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Server: http://forum.internal:8080"))
        .stdout(predicate::str::contains("Not logged in."));
}

#[test]
fn test_base_url_flag_beats_environment() {
    let dir = tempdir().unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", dir.path())
        .env("STACKIT_BASE_URL", "http://from-env:5000")
        .args(["status", "--base-url", "http://from-flag:5000"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Server: http://from-flag:5000"));
}
