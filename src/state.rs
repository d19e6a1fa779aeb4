//! Application state management for the exporter.
//!
//! This module defines the shared application state that is passed
//! to HTTP handlers.

use prometheus::{Gauge, Registry};
use std::sync::Arc;
use std::time::Instant;

use crate::config::Config;
use crate::gpu::GpuReader;
use crate::health_stats::HealthStats;
use crate::metrics::GpuMetrics;

/// Type alias for shared application state.
pub type SharedState = Arc<AppState>;

/// Global application state shared across requests.
pub struct AppState {
    pub registry: Registry,
    pub metrics: GpuMetrics,
    pub scrape_duration: Gauge,
    pub devices_total: Gauge,
    pub collect_success: Gauge,
    /// Process-wide NVML handle, opened once at startup.
    pub reader: GpuReader,
    pub config: Arc<Config>,
    pub health_stats: Arc<HealthStats>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}
