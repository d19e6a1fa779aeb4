//! Herakles GPU Exporter Library
//!
//! This library exposes the building blocks of the GPU exporter so they can
//! be exercised by integration tests and reused by downstream tooling:
//! configuration loading and validation, the NVML device reader types, the
//! Prometheus gauge families, and the exporter health statistics.
//!
//! The binary in `main.rs` wires these pieces into an axum HTTP server.

pub mod cli;
pub mod config;
pub mod gpu;
pub mod health_stats;
pub mod metrics;

// Re-export main types for convenience
pub use config::Config;
pub use gpu::{DeviceInfo, DeviceReading, GpuError, GpuReader};
pub use health_stats::HealthStats;
pub use metrics::GpuMetrics;
