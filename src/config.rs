//! Configuration management for herakles-gpu-exporter.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// Default configuration constants
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 12022;

/// Exporter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Server configuration
    pub port: Option<u16>,
    pub bind: Option<String>,

    // Device selection
    /// Export only these GPU indexes; None = all enumerated devices
    #[serde(alias = "devices")]
    pub devices: Option<Vec<u32>>,

    // Metrics enable flags
    #[serde(alias = "enable-temperature")]
    pub enable_temperature: Option<bool>,
    #[serde(alias = "enable-memory")]
    pub enable_memory: Option<bool>,
    #[serde(alias = "enable-utilization")]
    pub enable_utilization: Option<bool>,

    // Feature flags
    #[serde(alias = "enable-health")]
    pub enable_health: Option<bool>,
    #[serde(alias = "enable-telemetry")]
    pub enable_telemetry: Option<bool>,

    // Logging
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Some(DEFAULT_BIND_ADDR.to_string()),
            port: Some(DEFAULT_PORT),
            devices: None,
            enable_temperature: Some(true),
            enable_memory: Some(true),
            enable_utilization: Some(true),
            enable_health: Some(true),
            enable_telemetry: Some(true),
            log_level: Some("info".into()),
        }
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    // Metrics flags: at least one must be true
    let enable_temperature = cfg.enable_temperature.unwrap_or(true);
    let enable_memory = cfg.enable_memory.unwrap_or(true);
    let enable_utilization = cfg.enable_utilization.unwrap_or(true);

    if !(enable_temperature || enable_memory || enable_utilization) {
        return Err(
            "At least one of enable_temperature/enable_memory/enable_utilization must be true"
                .into(),
        );
    }

    // Device whitelist validation
    if let Some(devices) = &cfg.devices {
        if devices.is_empty() {
            return Err("devices is set but contains no GPU indexes".into());
        }
    }

    Ok(())
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref().and_then(|p| p.to_str()))?
    };

    // Override with CLI args
    if let Some(bind_ip) = args.bind {
        config.bind = Some(bind_ip.to_string());
    }

    // Only override port if the user supplied it on the CLI.
    if let Some(cli_port) = args.port {
        config.port = Some(cli_port);
    }

    // Parse comma-separated device indexes
    if let Some(devices_str) = &args.devices {
        let mut indexes = Vec::new();
        for part in devices_str.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let index: u32 = part
                .parse()
                .map_err(|_| format!("Invalid GPU index '{}' in --devices", part))?;
            indexes.push(index);
        }
        config.devices = Some(indexes);
    }

    // Feature flags
    if args.disable_health {
        config.enable_health = Some(false);
    }
    if args.disable_telemetry {
        config.enable_telemetry = Some(false);
    }
    if args.disable_temperature {
        config.enable_temperature = Some(false);
    }
    if args.disable_memory {
        config.enable_memory = Some(false);
    }
    if args.disable_utilization {
        config.enable_utilization = Some(false);
    }

    Ok(config)
}

/// Configuration loading with multiple format support
pub fn load_config(path: Option<&str>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = if let Some(p) = path {
        PathBuf::from(p)
    } else {
        // Try default locations
        let defaults = [
            "/etc/herakles/gpu-exporter.yaml",
            "/etc/herakles/gpu-exporter.yml",
            "/etc/herakles/gpu-exporter.json",
            "./herakles-gpu-exporter.yaml",
            "./herakles-gpu-exporter.yml",
            "./herakles-gpu-exporter.json",
        ];

        defaults
            .iter()
            .find(|p| Path::new(p).exists())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(""))
    };

    if !path.exists() || path.to_string_lossy().is_empty() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)?;

    match path.extension().and_then(|s| s.to_str()) {
        Some("json") => {
            let config: Config = serde_json::from_str(&content)?;
            info!("Loaded JSON configuration from: {}", path.display());
            Ok(config)
        }
        Some("toml") => {
            let config: Config = toml::from_str(&content)?;
            info!("Loaded TOML configuration from: {}", path.display());
            Ok(config)
        }
        _ => {
            // Default to YAML
            let config: Config = serde_yaml::from_str(&content)?;
            info!("Loaded YAML configuration from: {}", path.display());
            Ok(config)
        }
    }
}

/// Shows configuration in requested format
pub fn show_config(
    config: &Config,
    format: ConfigFormat,
    user_config: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };

    if user_config {
        println!("User configuration (effective values):");
    }
    println!("{output}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(validate_effective_config(&config).is_ok());
        assert_eq!(config.port, Some(DEFAULT_PORT));
    }

    #[test]
    fn test_all_metrics_disabled_is_invalid() {
        let config = Config {
            enable_temperature: Some(false),
            enable_memory: Some(false),
            enable_utilization: Some(false),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }

    #[test]
    fn test_empty_device_whitelist_is_invalid() {
        let config = Config {
            devices: Some(vec![]),
            ..Config::default()
        };
        assert!(validate_effective_config(&config).is_err());
    }
}
