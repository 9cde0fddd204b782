// urlquery-cli/tests/cli_integration.rs

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const REPORT_ID: &str = "82c4121d-d037-4d60-9f74-517bf00091ce";

/// Command with an isolated HOME and no URLQUERY_* leakage from the host.
fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("urlquery-cli").unwrap();
    cmd.env("HOME", home);
    for var in [
        "URLQUERY_APIKEY",
        "URLQUERY_OUTPUT",
        "URLQUERY_USERAGENT",
        "URLQUERY_ACCESS",
        "URLQUERY_BASE_URL",
        "URLQUERY_CONFIG",
        "URLQUERY_LOG",
        "CLICOLOR_FORCE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

/// Command wired to the mock server with an API key.
fn api_cli(home: &Path, server: &MockServer) -> Command {
    let mut cmd = cli(home);
    cmd.args(["--apikey", "test-key", "--base-url", &server.uri()]);
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let mut cmd = cli(home.path());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("submit"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("reputation"))
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--apikey"));
}

#[test]
fn test_version_command() {
    let home = TempDir::new().unwrap();
    let mut cmd = cli(home.path());
    cmd.arg("version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "urlquery-cli version {}",
            env!("CARGO_PKG_VERSION")
        )))
        .stdout(predicate::str::contains("Authors: urlquery-cli contributors"));
}

#[test]
fn test_missing_api_key_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = cli(home.path());
    cmd.args(["reputation", "http://example.com"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: API Key is required"));
}

#[test]
fn test_invalid_report_id_fails() {
    let home = TempDir::new().unwrap();
    let mut cmd = cli(home.path());
    cmd.args(["--apikey", "k", "report", "not-a-uuid", "report"]);

    cmd.assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid Report ID 'not-a-uuid'"));
}

#[test]
fn test_resource_requires_hash() {
    let home = TempDir::new().unwrap();
    let mut cmd = cli(home.path());
    cmd.args(["--apikey", "k", "report", REPORT_ID, "resource"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing resource hash"));
}

#[test]
fn test_config_round_trip() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("cfg.yaml");
    let config = config.to_str().unwrap();

    cli(home.path())
        .args(["--config", config, "config", "set", "apikey", "supersecret1234"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config updated: apikey = ***********1234"));

    cli(home.path())
        .args(["--config", config, "config", "set", "access", "private"])
        .assert()
        .success();

    let written = fs::read_to_string(config).unwrap();
    assert!(written.contains("apikey: supersecret1234"));
    assert!(written.contains("access: private"));

    cli(home.path())
        .args(["--config", config, "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("access: private"))
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("supersecret").not());

    cli(home.path())
        .args(["--config", config, "config", "unset", "apikey"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config key 'apikey' has been removed."));

    cli(home.path())
        .args(["--config", config, "config", "unset", "apikey"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config key 'apikey' is not set."));
}

#[test]
fn test_config_default_path_is_home() {
    let home = TempDir::new().unwrap();

    cli(home.path())
        .args(["config", "set", "output", "./downloads"])
        .assert()
        .success();

    let written = fs::read_to_string(home.path().join(".urlquery-cli.yaml")).unwrap();
    assert!(written.contains("output: ./downloads"));
}

#[test]
fn test_config_set_rejects_unknown_key_and_bad_access() {
    let home = TempDir::new().unwrap();

    cli(home.path())
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown config key 'colour'"));

    cli(home.path())
        .args(["config", "set", "access", "everyone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid access 'everyone'"));

    assert!(!home.path().join(".urlquery-cli.yaml").exists());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_writes_exact_bytes() {
    let server = MockServer::start().await;
    let body = br#"{"report_id":"82c4121d-d037-4d60-9f74-517bf00091ce",  "tags":["a"]}"#.to_vec();

    Mock::given(method("GET"))
        .and(path(format!("/public/v1/report/{}", REPORT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    api_cli(home.path(), &server)
        .args(["--output", out.path().to_str().unwrap()])
        .args(["report", REPORT_ID, "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Report written to"));

    let written = fs::read(out.path().join(format!("report_{}.json", REPORT_ID))).unwrap();
    assert_eq!(written, body);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_screenshot_written_to_output_dir() {
    let server = MockServer::start().await;
    let png = vec![0x89, b'P', b'N', b'G'];

    Mock::given(method("GET"))
        .and(path(format!("/public/v1/report/{}/screenshot", REPORT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(png.clone()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let nested = out.path().join("shots");

    api_cli(home.path(), &server)
        .args(["--output", nested.to_str().unwrap()])
        .args(["report", REPORT_ID, "screenshot"])
        .assert()
        .success();

    let written = fs::read(nested.join(format!("screenshot_{}.png", REPORT_ID))).unwrap();
    assert_eq!(written, png);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_resource_hash_with_separators_stays_in_output_dir() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"body".to_vec()))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    api_cli(home.path(), &server)
        .args(["--output", out.path().to_str().unwrap()])
        .args(["report", REPORT_ID, "resource", "../x/y#z"])
        .assert()
        .success();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        requests[0].url.path(),
        format!("/public/v1/report/{}/resource/..%2Fx%2Fy%23z", REPORT_ID)
    );

    let written = fs::read(out.path().join("resource_..%2Fx%2Fy%23z")).unwrap();
    assert_eq!(written, b"body");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_report_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/public/v1/report/{}", REPORT_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "report_id": REPORT_ID,
            "url": {"addr": "example.com/login"},
            "final": {"title": "Sign in"},
            "summary": [{"fqdn": "example.com", "first_seen": "2024-03-05T12:30:00Z", "received_data": 1500}]
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    api_cli(home.path(), &server)
        .args(["--summary", "report", REPORT_ID, "report"])
        .assert()
        .success()
        .stdout(predicate::str::contains("example.com/login"))
        .stdout(predicate::str::contains("Sign in"))
        .stdout(predicate::str::contains("2024-03-05"))
        .stdout(predicate::str::contains("1.5 kB"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_reputation_json_and_summary() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/reputation/check/"))
        .and(query_param("query", "http://example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "http://example.com",
            "verdict": "malicious"
        })))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();

    api_cli(home.path(), &server)
        .args(["reputation", "http://example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"malicious\""));

    api_cli(home.path(), &server)
        .args(["--summary", "reputation", "http://example.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Malicious"))
        .stdout(predicate::str::contains("🚫"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_key_from_config_file() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/search/reports/"))
        .and(wiremock::matchers::header("x-apikey", "from-file"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "query": "phish",
            "total_hits": 1,
            "limit": 3,
            "offset": 0,
            "reports": [{"report_id": REPORT_ID, "url": {"addr": "example.com/x"}}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".urlquery-cli.yaml"), "apikey: from-file\n").unwrap();

    cli(home.path())
        .args(["--base-url", &server.uri(), "--summary"])
        .args(["search", "phish", "--limit", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(REPORT_ID))
        .stdout(predicate::str::contains("example.com/x"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_api_error_exit_code() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    api_cli(home.path(), &server)
        .args(["report", REPORT_ID, "domain_graph"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("API Error (HTTP StatusCode: 404) not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_no_wait() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/public/v1/submit/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue_id": "q-42",
            "status": "queued"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    api_cli(home.path(), &server)
        .args(["submit", "https://example.com", "--tags", "ok_1,bad tag!", "--no-wait"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"queue_id\": \"q-42\""))
        .stderr(predicate::str::contains("Removed invalid tag"))
        .stderr(predicate::str::contains("tag=bad tag!"))
        // stderr is a pipe here, so log lines carry no color codes
        .stderr(predicate::str::contains("\u{1b}[").not());

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["tags"], json!(["ok_1"]));
    assert_eq!(body["access"], "public");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_waits_for_report() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/public/v1/submit/url"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue_id": "q-9",
            "status": "queued"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public/v1/submit/status/q-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue_id": "q-9",
            "report_id": REPORT_ID,
            "status": "done"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    api_cli(home.path(), &server)
        .args(["submit", "https://example.com", "--interval", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "https://urlquery.net/report/{}",
            REPORT_ID
        )));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_submit_status_subcommand() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/public/v1/submit/status/q-5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "queue_id": "q-5",
            "status": "analyzing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let home = TempDir::new().unwrap();
    api_cli(home.path(), &server)
        .args(["submit", "status", "q-5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"status\": \"analyzing\""));
}
