//! Integration tests for building a client from the TOML config file.
//!
//! Tests loading the `[stream]` section, defaults for missing keys, and the
//! save/load round trip through a temp directory.

mod common;

use std::time::Duration;

use sea_core::config::AppConfig;
use sea_stream::{ClientOptions, DispatchMode, Network, SeaError, StreamClient};
use tempfile::TempDir;

#[test]
fn options_from_toml_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[stream]
token = "abc123"
network = "mainnet"
collections = ["azuki", "doodles-official"]
heartbeat_interval_secs = 15
retry_interval_secs = 2
max_retries = 4
dispatch_queue_capacity = 32

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = AppConfig::load_from_file(&path).unwrap();
    let options = ClientOptions::from_config(&config.stream);

    assert_eq!(options.token, "abc123");
    assert_eq!(options.network, Network::Mainnet);
    assert_eq!(options.topics, vec!["azuki", "doodles-official"]);
    assert_eq!(options.heartbeat_interval, Duration::from_secs(15));
    assert_eq!(options.retry_interval, Duration::from_secs(2));
    assert_eq!(options.max_retries, 4);
    assert_eq!(options.dispatch, DispatchMode::Queued { capacity: 32 });
    assert_eq!(
        options.socket_url(),
        "wss://stream.openseabeta.com/socket/websocket?token=abc123"
    );
}

#[test]
fn missing_keys_fall_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[stream]\ntoken = \"abc123\"\n").unwrap();

    let config = AppConfig::load_from_file(&path).unwrap();
    let options = ClientOptions::from_config(&config.stream);

    assert_eq!(options.network, Network::Testnet);
    assert!(options.topics.is_empty());
    assert_eq!(options.heartbeat_interval, Duration::from_secs(30));
    assert_eq!(options.retry_interval, Duration::from_secs(5));
    assert_eq!(options.max_retries, 3);
    assert_eq!(options.dispatch, DispatchMode::Inline);
    assert_eq!(
        options.socket_url(),
        "wss://testnets-stream.openseabeta.com/socket/websocket?token=abc123"
    );
}

#[test]
fn saved_config_reloads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = AppConfig::default();
    config.stream.token = "saved".into();
    config.stream.collections = vec!["pudgypenguins".into()];

    config.save_to_file(&path).unwrap();
    let loaded = AppConfig::load_from_file(&path).unwrap();

    assert_eq!(loaded.stream.token, "saved");
    assert_eq!(loaded.stream.collections, vec!["pudgypenguins"]);
    assert!(loaded.stream.has_token());
}

#[tokio::test]
async fn configured_collections_get_heartbeats() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[stream]\ntoken = \"t\"\ncollections = [\"azuki\"]\n").unwrap();
    let config = AppConfig::load_from_file(&path).unwrap();
    let options = ClientOptions::from_config(&config.stream)
        .with_heartbeat_interval(Duration::from_millis(30));

    let server = common::MockServer::new();
    let client = StreamClient::with_dialer(options, server.dialer());
    client.connect().await.unwrap();

    assert!(common::wait_until(|| !server.sent_events("heartbeat").is_empty()).await);
    assert_eq!(server.sent_events("heartbeat")[0]["ref"], "azuki");
    client.close().await.unwrap();
}

#[tokio::test]
async fn zero_retry_interval_is_rejected_before_dialing() {
    let server = common::MockServer::new();
    let options = ClientOptions::new("t").with_retry_interval(Duration::ZERO);
    let client = StreamClient::with_dialer(options, server.dialer());

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, SeaError::Config(_)));
    assert_eq!(server.dial_attempts(), 0);
}
