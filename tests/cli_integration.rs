//! CLI Integration Tests
//!
//! Tests the command-line interface end-to-end against a local fake API.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use assert_cmd::Command;
use assert_fs::prelude::*;
use predicates::prelude::*;

const HEALTHY: &str = r#"{"success":true,"data":{"status":"ok","version":"1.0"}}"#;

/// Get the binary to test, isolated from the caller's environment.
fn plugix(dir: &assert_fs::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plugix").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("PLUGIX_API_KEY")
        .env_remove("PLUGIX_API_URL")
        .env_remove("PLUGIX_PLATFORM");
    cmd
}

/// Serve `body` with status 200 to every request. Returns the base URL.
fn spawn_api(body: &'static str) -> String {
    spawn_recording_api(body).0
}

/// Like [`spawn_api`], also forwarding each request body to the receiver.
fn spawn_recording_api(body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let _ = tx.send(read_request_body(&stream));
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{addr}"), rx)
}

fn read_request_body(stream: &TcpStream) -> String {
    let mut reader = BufReader::new(stream);
    let mut content_length = 0;

    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).unwrap_or(0) == 0 || line == "\r\n" {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().unwrap_or(0);
            }
        }
    }

    let mut body = vec![0; content_length];
    let _ = reader.read_exact(&mut body);
    String::from_utf8_lossy(&body).into_owned()
}

/// First request that carried a JSON body.
fn posted_json(requests: &mpsc::Receiver<String>) -> serde_json::Value {
    loop {
        let body = requests.recv_timeout(Duration::from_secs(5)).unwrap();
        if !body.is_empty() {
            return serde_json::from_str(&body).unwrap();
        }
    }
}

fn catalog_config(dir: &assert_fs::TempDir, url: &str) -> std::path::PathBuf {
    let catalog = dir.child("catalog.json");
    catalog
        .write_str(r#"{"products":[{"id":1,"sku":"CH-1","name":"Chair","category":"chairs"}]}"#)
        .unwrap();
    write_config(
        dir,
        &format!(
            "api_key = \"sk_test\"\napi_url = \"{url}\"\n\n[catalog]\npath = \"{}\"\n",
            catalog.path().display()
        ),
    )
}

fn write_config(dir: &assert_fs::TempDir, contents: &str) -> std::path::PathBuf {
    let file = dir.child("plugix.toml");
    file.write_str(contents).unwrap();
    file.path().to_path_buf()
}

// ============================================================================
// Help & Version Tests
// ============================================================================

#[test]
fn test_help_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plugix AI API"));
}

#[test]
fn test_version_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_start_help_lists_daemon_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--daemon"))
        .stdout(predicate::str::contains("-d"));
}

// ============================================================================
// Start Command Tests
// ============================================================================

#[test]
fn test_start_lists_tools_and_exits() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(HEALTHY);
    let config = write_config(&dir, &format!("api_key = \"sk_test\"\napi_url = \"{url}\"\n"));

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .success()
        .stdout(predicate::str::contains("connected successfully"))
        .stdout(predicate::str::contains("get_products, get_categories"));
}

#[test]
fn test_start_disabled_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = write_config(&dir, "api_key = \"sk_test\"\n\n[mcp]\nenabled = false\n");

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .failure()
        .stdout(predicate::str::contains("MCP is disabled"));
}

#[test]
fn test_start_without_api_key_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = write_config(&dir, "platform = \"pimcore\"\n");

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("api_key is required"));
}

#[test]
fn test_start_reports_api_failure_message() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(r#"{"success":false,"error":{"message":"Invalid API key"}}"#);
    let config = write_config(&dir, &format!("api_key = \"sk_bad\"\napi_url = \"{url}\"\n"));

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["start", "-d"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to connect: Invalid API key"));
}

#[test]
fn test_start_unhealthy_status_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(r#"{"success":true,"data":{"status":"degraded"}}"#);
    let config = write_config(&dir, &format!("api_key = \"sk_test\"\napi_url = \"{url}\"\n"));

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Failed to connect"));
}

#[test]
fn test_api_key_from_environment() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(HEALTHY);
    let config = write_config(&dir, &format!("api_url = \"{url}\"\n"));

    plugix(&dir)
        .env("PLUGIX_API_KEY", "sk_from_env")
        .arg("--config")
        .arg(&config)
        .arg("start")
        .assert()
        .success();
}

// ============================================================================
// Tool Tests
// ============================================================================

#[test]
fn test_tools_lists_all_tools() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_products"))
        .stdout(predicate::str::contains("save_translations"))
        .stdout(predicate::str::contains("get_stats"));
}

#[test]
fn test_exec_get_products_from_catalog_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(HEALTHY);
    let catalog = dir.child("catalog.json");
    catalog
        .write_str(
            r#"{"products":[
                {"id":1,"sku":"CH-1","name":"Chair","category":"chairs"},
                {"id":2,"sku":"LA-1","name":"Lamp","category":"lighting"}
            ],"categories":[]}"#,
        )
        .unwrap();
    let config = write_config(
        &dir,
        &format!(
            "api_key = \"sk_test\"\napi_url = \"{url}\"\n\n[catalog]\npath = \"{}\"\n",
            catalog.path().display()
        ),
    );

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["exec", "get_products", "--params", r#"{"category":"lighting"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("LA-1"))
        .stdout(predicate::str::contains("CH-1").not());
}

#[test]
fn test_exec_unknown_tool_fails() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(HEALTHY);
    let config = write_config(&dir, &format!("api_key = \"sk_test\"\napi_url = \"{url}\"\n"));

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["exec", "delete_everything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tool not found: delete_everything"));
}

#[test]
fn test_exec_rejects_non_object_params() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .args(["exec", "get_products", "--params", "[1,2]"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("JSON object"));
}

// ============================================================================
// Config Command Tests
// ============================================================================

#[test]
fn test_config_masks_api_key() {
    let dir = assert_fs::TempDir::new().unwrap();
    let config = write_config(&dir, "api_key = \"sk_live_supersecret\"\n");

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("sk_live_"))
        .stdout(predicate::str::contains("supersecret").not());
}

#[test]
fn test_config_reads_local_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child(".plugix.toml").write_str("platform = \"magento\"\n").unwrap();

    plugix(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("magento"));
}

#[test]
fn test_ai_translate_rejects_unconfigured_language() {
    let dir = assert_fs::TempDir::new().unwrap();
    let url = spawn_api(r#"{"success":true,"data":{}}"#);
    let config = write_config(&dir, &format!("api_key = \"sk_test\"\napi_url = \"{url}\"\n"));

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["ai", "translate", "--language", "ja"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not configured"));
}

#[test]
fn test_ai_translate_sends_default_options() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, requests) = spawn_recording_api(r#"{"success":true,"data":{}}"#);
    let config = catalog_config(&dir, &url);

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["ai", "translate", "--language", "de"])
        .assert()
        .success();

    let body = posted_json(&requests);
    assert_eq!(body["targetLanguage"], "de");
    assert_eq!(body["context"], "ecommerce");
    assert_eq!(body["preserveTone"], true);
    assert_eq!(body["content"][0]["sku"], "CH-1");
}

#[test]
fn test_ai_translate_custom_context() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, requests) = spawn_recording_api(r#"{"success":true,"data":{}}"#);
    let config = catalog_config(&dir, &url);

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["ai", "translate", "--language", "fr", "--context", "furniture"])
        .assert()
        .success();

    assert_eq!(posted_json(&requests)["context"], "furniture");
}

#[test]
fn test_ai_describe_sends_default_options() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, requests) = spawn_recording_api(r#"{"success":true,"data":{}}"#);
    let config = catalog_config(&dir, &url);

    plugix(&dir).arg("--config").arg(&config).args(["ai", "describe"]).assert().success();

    let body = posted_json(&requests);
    assert_eq!(body["languages"], serde_json::json!(["en"]));
    assert_eq!(body["tone"], "professional");
    assert_eq!(body["maxLength"], 500);
}

#[test]
fn test_ai_describe_language_flags() {
    let dir = assert_fs::TempDir::new().unwrap();
    let (url, requests) = spawn_recording_api(r#"{"success":true,"data":{}}"#);
    let config = catalog_config(&dir, &url);

    plugix(&dir)
        .arg("--config")
        .arg(&config)
        .args(["ai", "describe", "-l", "de", "-l", "fr"])
        .assert()
        .success();

    assert_eq!(posted_json(&requests)["languages"], serde_json::json!(["de", "fr"]));
}

// ============================================================================
// Completions Tests
// ============================================================================

#[test]
fn test_completions_bash() {
    let dir = assert_fs::TempDir::new().unwrap();
    plugix(&dir)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("plugix"));
}
