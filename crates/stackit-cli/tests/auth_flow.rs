use std::fs;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::tempdir;
use wiremock::matchers::{any, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn can_bind_localhost() -> bool {
    std::net::TcpListener::bind("127.0.0.1:0").is_ok()
}

fn stackit(home: &Path, server: &MockServer) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("stackit");
    cmd.env("STACKIT_HOME", home)
        .env("STACKIT_BASE_URL", server.uri())
        .env_remove("STACKIT_LOG");
    cmd
}

async fn mount_empty_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/questions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"questions": []})))
        .mount(server)
        .await;
}

fn stored_token(home: &Path) -> Option<String> {
    let contents = fs::read_to_string(home.join("credentials.json")).ok()?;
    let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
    value["token"].as_str().map(ToString::to_string)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_saves_token_and_shows_listing() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"identifier": "alice", "password": "Secret123"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-alice",
            "refresh_token": "refresh-alice"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_listing(&server).await;

    let home = tempdir().unwrap();
    stackit(home.path(), &server)
        .args(["login", "--identifier", "alice", "--password", "Secret123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged in as alice"))
        .stdout(predicate::str::contains("No questions yet."))
        .stdout(predicate::str::contains("jwt-alice").not());

    assert_eq!(stored_token(home.path()).as_deref(), Some("jwt-alice"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_reads_missing_fields_from_stdin() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"identifier": "bob@example.com", "password": "hunter22"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "jwt-bob"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_listing(&server).await;

    let home = tempdir().unwrap();
    stackit(home.path(), &server)
        .arg("login")
        .write_stdin("bob@example.com\nhunter22\n")
        .assert()
        .success();

    assert_eq!(stored_token(home.path()).as_deref(), Some("jwt-bob"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_failure_shows_server_message() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "invalid credentials"})),
        )
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    stackit(home.path(), &server)
        .args(["login", "-i", "alice", "-p", "wrong"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid credentials"));

    assert_eq!(stored_token(home.path()), None);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_register_logs_in() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/register"))
        .and(body_json(json!({
            "username": "carol",
            "email": "carol@example.com",
            "password": "Passw0rdX"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"access_token": "abc123"})))
        .expect(1)
        .mount(&server)
        .await;
    mount_empty_listing(&server).await;

    let home = tempdir().unwrap();
    stackit(home.path(), &server)
        .args([
            "register",
            "--username",
            "carol",
            "--email",
            "carol@example.com",
            "--password",
            "Passw0rdX",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Registered and logged in as carol"));

    assert_eq!(stored_token(home.path()).as_deref(), Some("abc123"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_logout_is_local() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    fs::write(home.path().join("credentials.json"), r#"{"token": "tok"}"#).unwrap();

    stackit(home.path(), &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged out"));

    assert_eq!(stored_token(home.path()), None);

    stackit(home.path(), &server)
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn test_logout_clears_empty_token_entry() {
    let home = tempdir().unwrap();
    let credentials = home.path().join("credentials.json");
    fs::write(&credentials, r#"{"token": ""}"#).unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", home.path())
        .env_remove("STACKIT_BASE_URL")
        .env_remove("STACKIT_LOG")
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&credentials).unwrap()).unwrap();
    assert!(value.get("token").is_none());
}

#[test]
fn test_logout_repairs_corrupt_credentials() {
    let home = tempdir().unwrap();
    let credentials = home.path().join("credentials.json");
    fs::write(&credentials, "{not json").unwrap();

    cargo_bin_cmd!("stackit")
        .env("STACKIT_HOME", home.path())
        .env_remove("STACKIT_BASE_URL")
        .env_remove("STACKIT_LOG")
        .arg("logout")
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&credentials).unwrap()).unwrap();
    assert!(value.get("token").is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_remote_fetches_profile() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/auth/me"))
        .and(header("authorization", "Bearer tok-status-1234"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"id": 1, "username": "alice", "email": "alice@example.com", "reputation": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = tempdir().unwrap();
    fs::write(
        home.path().join("credentials.json"),
        r#"{"token": "tok-status-1234"}"#,
    )
    .unwrap();

    stackit(home.path(), &server)
        .args(["status", "--remote"])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Logged in"))
        .stdout(predicate::str::contains("User: alice"))
        .stdout(predicate::str::contains("Reputation: 42"))
        .stdout(predicate::str::contains("tok-status-1234").not());
}
