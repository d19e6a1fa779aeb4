//! Integration tests for configuration loading and validation.
//!
//! These tests verify that config files in all supported formats load
//! correctly, that defaults apply when no file is present, and that
//! validation rejects unusable configurations.

use herakles_gpu_exporter::config::{
    load_config, validate_effective_config, Config, DEFAULT_BIND_ADDR, DEFAULT_PORT,
};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_missing_file_yields_defaults() {
    let config = load_config(Some("/nonexistent/path/gpu-exporter.yaml")).unwrap();
    assert_eq!(config.port, Some(DEFAULT_PORT));
    assert_eq!(config.bind.as_deref(), Some(DEFAULT_BIND_ADDR));
    assert!(config.devices.is_none());
}

#[test]
fn test_load_yaml_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exporter.yaml");
    fs::write(
        &path,
        "port: 19000\nbind: \"127.0.0.1\"\ndevices: [0, 2]\nenable_temperature: false\n",
    )
    .unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.port, Some(19000));
    assert_eq!(config.bind.as_deref(), Some("127.0.0.1"));
    assert_eq!(config.devices, Some(vec![0, 2]));
    assert_eq!(config.enable_temperature, Some(false));
    // Unset fields stay None so defaults apply downstream
    assert_eq!(config.enable_memory, None);
}

#[test]
fn test_load_yaml_config_with_dashed_aliases() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exporter.yaml");
    fs::write(
        &path,
        "enable-temperature: false\nenable-utilization: false\nenable-health: false\n",
    )
    .unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.enable_temperature, Some(false));
    assert_eq!(config.enable_utilization, Some(false));
    assert_eq!(config.enable_health, Some(false));
}

#[test]
fn test_load_json_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exporter.json");
    fs::write(&path, r#"{"port": 18000, "devices": [1]}"#).unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.port, Some(18000));
    assert_eq!(config.devices, Some(vec![1]));
}

#[test]
fn test_load_toml_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exporter.toml");
    fs::write(&path, "port = 17000\nenable_memory = false\n").unwrap();

    let config = load_config(path.to_str()).unwrap();
    assert_eq!(config.port, Some(17000));
    assert_eq!(config.enable_memory, Some(false));
}

#[test]
fn test_invalid_yaml_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("exporter.yaml");
    fs::write(&path, "port: [not a number\n").unwrap();

    assert!(load_config(path.to_str()).is_err());
}

#[test]
fn test_default_config_validates() {
    assert!(validate_effective_config(&Config::default()).is_ok());
}

#[test]
fn test_validation_requires_one_metric_family() {
    let config = Config {
        enable_temperature: Some(false),
        enable_memory: Some(false),
        enable_utilization: Some(false),
        ..Config::default()
    };

    let err = validate_effective_config(&config).unwrap_err();
    assert!(err.to_string().contains("At least one"));
}

#[test]
fn test_validation_single_family_is_enough() {
    let config = Config {
        enable_temperature: Some(false),
        enable_memory: Some(false),
        enable_utilization: Some(true),
        ..Config::default()
    };
    assert!(validate_effective_config(&config).is_ok());
}

#[test]
fn test_validation_rejects_empty_device_whitelist() {
    let config = Config {
        devices: Some(vec![]),
        ..Config::default()
    };

    let err = validate_effective_config(&config).unwrap_err();
    assert!(err.to_string().contains("devices"));
}

#[test]
fn test_validation_accepts_device_whitelist() {
    let config = Config {
        devices: Some(vec![0, 1, 3]),
        ..Config::default()
    };
    assert!(validate_effective_config(&config).is_ok());
}
