use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use tempfile::TempDir;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chaindb(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("chaindb").unwrap();
    cmd.env("HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("CHAINDB_LOG");
    cmd
}

fn write_config(home: &TempDir, host: &str) {
    let config = json!({ "host": host });
    fs::write(
        home.path().join(".chaindb-config.json"),
        serde_json::to_string_pretty(&config).unwrap(),
    )
    .unwrap();
}

fn write_token(home: &TempDir) {
    let token = json!({ "token": "tok", "database": "shop" });
    fs::write(home.path().join(".chaindb-token.json"), token.to_string()).unwrap();
}

#[test]
fn no_arguments_prints_help() {
    let home = TempDir::new().unwrap();
    chaindb(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("CLI to interact with ChainDB"));
}

#[test]
fn unknown_argument_exits_one() {
    let home = TempDir::new().unwrap();
    chaindb(&home).args(["table", "nope"]).assert().code(1);
}

#[test]
fn config_rejects_non_http_host() {
    let home = TempDir::new().unwrap();
    chaindb(&home)
        .args(["config", "--host", "ftp://x"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Host must start with http:// or https://"));
    assert!(!home.path().join(".chaindb-config.json").exists());
}

#[test]
fn config_round_trip() {
    let home = TempDir::new().unwrap();
    chaindb(&home)
        .args(["config", "--host", "http://localhost:2818"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Host configured to: http://localhost:2818"));

    chaindb(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout("http://localhost:2818\n");
}

#[test]
fn corrupt_config_falls_back_to_default() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".chaindb-config.json"), "garbage").unwrap();
    chaindb(&home)
        .args(["config", "--show"])
        .assert()
        .success()
        .stdout("http://localhost:2818\n");
}

#[test]
fn table_command_requires_connection() {
    let home = TempDir::new().unwrap();
    chaindb(&home)
        .args(["table", "list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("You are not authenticated"));
}

#[test]
fn invalid_limit_exits_one() {
    let home = TempDir::new().unwrap();
    write_token(&home);
    chaindb(&home)
        .args(["table", "find", "users", "-c", "{}", "-l", "0"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("The limit must be a positive number."));
}

#[test]
fn connect_to_unreachable_host_exits_one() {
    let home = TempDir::new().unwrap();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    write_config(&home, &format!("http://127.0.0.1:{port}"));

    chaindb(&home)
        .args(["db", "connect", "-n", "shop", "-u", "admin", "-p", "pw"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Could not connect to server at"));
    assert!(!home.path().join(".chaindb-token.json").exists());
}

#[test]
fn find_against_server() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/v1/table/users/find"))
            .and(body_json(json!({"criteria": {"age": 30}, "limit": 5, "reverse": true})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .mount(&server),
    );
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/v1/table/orders/find"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "message": "bad credentials"})),
            )
            .mount(&server),
    );

    let home = TempDir::new().unwrap();
    write_config(&home, &server.uri());
    write_token(&home);

    chaindb(&home)
        .args(["table", "find", "users", "-c", r#"{"age": 30}"#, "-l", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No records found matching the provided criteria."));

    chaindb(&home)
        .args(["table", "find", "orders", "-c", "{}"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Search failed: bad credentials"));
}

#[test]
fn connect_stores_token() {
    let rt = Runtime::new().unwrap();
    let server = rt.block_on(MockServer::start());
    rt.block_on(
        Mock::given(method("POST"))
            .and(path("/api/v1/database/connect"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": "tok-9"})),
            )
            .mount(&server),
    );

    let home = TempDir::new().unwrap();
    write_config(&home, &server.uri());

    chaindb(&home)
        .args(["db", "connect", "-n", "shop", "-u", "admin", "-p", "pw"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Connected to database 'shop' successfully!"));

    let stored: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(home.path().join(".chaindb-token.json")).unwrap())
            .unwrap();
    assert_eq!(stored, json!({"token": "tok-9", "database": "shop"}));
}
