// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic

//! Configuration file to request descriptor.

use influx_bridge::{BridgeConfig, ConfigError, ErrorKind, Message, Pipeline};
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
profiles:
  local:
    host: localhost
    port: 8086
    database: telemetry
    org: acme
    token: "file-token"
  cloud:
    host: cloud.example.com
    port: 443
    database: sensors
    version: "3"
    token: "cloud-token"
    tls: true
  empty:
    host: localhost
    database: telemetry
queries:
  - name: cpu-recent
    profile: cloud
    table: cpu
    default_time_span: 3600
  - name: no-token
    profile: empty
    table: cpu
writers:
  - name: ingest
    profile: local
    tags: "site=lab"
    timeout_ms: 2500
"#;

fn config_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tempfile");
    file.write_all(content.as_bytes()).expect("write config");
    file
}

#[test]
fn test_query_node_from_file() {
    let file = config_file(CONFIG);
    let config = BridgeConfig::from_file(file.path()).expect("load");
    let node = config
        .query_node("cpu-recent", &config.registry())
        .expect("node");

    let request = node.request(&Message::new()).expect("request");
    assert_eq!(request.time_span, 3600);
    assert!(request
        .descriptor
        .url
        .starts_with("https://cloud.example.com:443/api/v3/query_sql?"));
    assert_eq!(
        request.descriptor.header_value("Authorization"),
        Some("Bearer cloud-token")
    );
}

#[test]
fn test_write_node_from_file() {
    let file = config_file(CONFIG);
    let config = BridgeConfig::from_file(file.path()).expect("load");
    let node = config.write_node("ingest", &config.registry()).expect("node");

    let out = node
        .handle(Message::new().with("payload", json!(["temp value=21.5 1690000000"])))
        .expect("handle")
        .into_value();
    assert_eq!(out["payload"], json!("temp,tag_0=site\\=lab value=21.5 1690000000"));
    assert_eq!(out["timeout"], json!(2500));
    assert_eq!(
        out["url"],
        json!("http://localhost:8086/api/v2/write?org=acme&bucket=telemetry&precision=ns")
    );
}

#[test]
fn test_empty_token_fails_per_invocation() {
    let file = config_file(CONFIG);
    let config = BridgeConfig::from_file(file.path()).expect("empty token loads");
    let node = config.query_node("no-token", &config.registry()).expect("node");
    let err = node.handle(Message::new()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
}

#[test]
fn test_load_errors() {
    let missing = BridgeConfig::from_file("/nonexistent/influx-bridge.yaml").unwrap_err();
    assert!(matches!(missing, ConfigError::Io(_)));

    let file = config_file("profiles: [not, a, map]\n");
    assert!(matches!(
        BridgeConfig::from_file(file.path()).unwrap_err(),
        ConfigError::Yaml(_)
    ));
}

#[test]
fn test_generated_example_loads() {
    let file = config_file(&BridgeConfig::example().to_yaml().expect("yaml"));
    let config = BridgeConfig::from_file(file.path()).expect("example loads");
    let registry = config.registry();
    for q in &config.queries {
        assert!(config.query_node(&q.name, &registry).is_ok());
    }
    for w in &config.writers {
        assert!(config.write_node(&w.name, &registry).is_ok());
    }
}
