//! Integration tests for configuration loading from disk.

use std::fs;
use std::net::SocketAddr;
use std::time::Duration;

use figma_bridge_mcp::config::load_config_with_port;
use figma_bridge_mcp::error::ConfigError;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.json");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_file_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"{
            "_comment": "local bridge",
            "bridge": {"port": 4100, "request_timeout_secs": 10},
            "logging": {"level": "info"}
        }"#,
    );

    let config = load_config_with_port(Some(&path), None).unwrap();
    assert_eq!(
        config.listen_addr().unwrap(),
        "127.0.0.1:4100".parse::<SocketAddr>().unwrap()
    );
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_port_override_beats_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"bridge": {"port": 4100}}"#);

    let config = load_config_with_port(Some(&path), Some("5200")).unwrap();
    assert_eq!(config.bridge.port, 5200);

    let config = load_config_with_port(Some(&path), Some("")).unwrap();
    assert_eq!(config.bridge.port, 4100);
}

#[test]
fn test_invalid_port_override_is_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "{}");

    let err = load_config_with_port(Some(&path), Some("figma")).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
    assert!(err.to_string().contains("figma"));
}

#[test]
fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"bridge": "#);

    let err = load_config_with_port(Some(&path), None).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_invalid_field_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, r#"{"bridge": {"host": "figma.local"}}"#);

    let err = load_config_with_port(Some(&path), None).unwrap_err();
    assert!(matches!(err, ConfigError::ValidationError { .. }));
}

#[test]
fn test_out_of_range_timeout_is_validation_error() {
    let dir = TempDir::new().unwrap();

    for secs in ["0", "86401", "18446744073709551615"] {
        let path = write_config(
            &dir,
            &format!(r#"{{"bridge": {{"request_timeout_secs": {secs}}}}}"#),
        );
        let err = load_config_with_port(Some(&path), None).unwrap_err();
        assert!(
            matches!(err, ConfigError::ValidationError { .. }),
            "timeout {secs} was accepted"
        );
    }

    let path = write_config(&dir, r#"{"bridge": {"request_timeout_secs": 86400}}"#);
    let config = load_config_with_port(Some(&path), None).unwrap();
    assert_eq!(config.request_timeout(), Duration::from_secs(86_400));
}

#[test]
fn test_missing_explicit_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    let err = load_config_with_port(Some(&path), None).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound { .. }));
}
