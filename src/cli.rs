//! CLI arguments and subcommands for herakles-gpu-exporter.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::IpAddr;
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "herakles-gpu-exporter",
    about = "Prometheus exporter for NVIDIA GPU temperature, memory and utilization metrics",
    long_about = "Prometheus exporter for NVIDIA GPU temperature, memory and utilization metrics.\n\n\
                  Reads per-device telemetry through the NVIDIA Management Library (NVML) on \
                  every scrape and exposes it in the Prometheus text exposition format.",
    author = "Michael Moll <exporter@herakles.now> - Herakles",
    version = "0.1.0",
    propagate_version = true,
    after_help = "Project: https://github.com/cansp-dev/herakles-gpu-exporter — More info: https://www.herakles.now — Support: exporter@herakles.now"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// HTTP listen port
    #[arg(short = 'p', long)]
    pub port: Option<u16>,

    /// Bind to specific interface/IP
    #[arg(long)]
    pub bind: Option<IpAddr>,

    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Print only the loaded user config file + full path and exit
    #[arg(long)]
    pub show_user_config: bool,

    /// Output format for --show-config*
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 1 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Export only these GPU indexes (comma-separated, e.g. "0,2")
    #[arg(short = 'd', long)]
    pub devices: Option<String>,

    /// Disable /health endpoint
    #[arg(long)]
    pub disable_health: bool,

    /// Disable internal gpu_exporter_* metrics
    #[arg(long)]
    pub disable_telemetry: bool,

    /// Disable gpu_temperature metric
    #[arg(long)]
    pub disable_temperature: bool,

    /// Disable gpu_memory_* metrics
    #[arg(long)]
    pub disable_memory: bool,

    /// Disable gpu_utilization/mem_utilization metrics
    #[arg(long)]
    pub disable_utilization: bool,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate NVML access and configuration
    Check {
        /// Check NVML library initialization
        #[arg(long)]
        nvml: bool,

        /// Check per-device telemetry reads
        #[arg(long)]
        devices: bool,

        /// Check everything
        #[arg(long)]
        all: bool,
    },

    /// Generate configuration files
    Config {
        /// Output file path
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// Test metrics collection
    Test {
        /// Number of test iterations
        #[arg(short = 'n', long, default_value_t = 1)]
        iterations: usize,

        /// Show detailed per-device readings
        #[arg(long)]
        verbose: bool,
    },

    /// List detected GPUs
    Devices {
        /// Show driver and library versions
        #[arg(long)]
        verbose: bool,
    },
}
