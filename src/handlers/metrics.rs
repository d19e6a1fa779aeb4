//! Metrics endpoint handler for Prometheus scraping.
//!
//! This module provides the `/metrics` endpoint handler that reads fresh
//! telemetry from every enumerated GPU and returns it in Prometheus text
//! format. Nothing is cached between scrapes.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use prometheus::{Encoder, TextEncoder};
use std::time::Instant;
use tracing::{debug, error, instrument, warn};

use crate::state::SharedState;

/// Buffer capacity for metrics encoding.
const BUFFER_CAP: usize = 16 * 1024;

/// Error type for metrics endpoint failures.
#[derive(Debug)]
pub enum MetricsError {
    EncodingFailed,
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> axum::response::Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to encode metrics",
        )
            .into_response()
    }
}

/// Handler for the /metrics endpoint.
#[instrument(skip(state))]
pub async fn metrics_handler(State(state): State<SharedState>) -> Result<String, MetricsError> {
    let start = Instant::now();
    debug!("Processing /metrics request");

    let cfg = &state.config;
    let enable_temperature = cfg.enable_temperature.unwrap_or(true);
    let enable_memory = cfg.enable_memory.unwrap_or(true);
    let enable_utilization = cfg.enable_utilization.unwrap_or(true);

    // ========== PHASE 1: Reset device families ==========
    // Devices that disappeared since the previous scrape must not leave
    // stale samples behind.
    state.metrics.reset_device_metrics();

    // ========== PHASE 2: Enumerate and read all devices ==========
    let collect_start = Instant::now();
    let mut exported_count = 0u64;

    match state.reader.device_count() {
        Ok(count) => {
            for index in 0..count {
                if let Some(whitelist) = &cfg.devices {
                    if !whitelist.contains(&index) {
                        continue;
                    }
                }

                match state.reader.read_device(index) {
                    Ok(reading) => {
                        state.metrics.record_reading(
                            &reading,
                            enable_temperature,
                            enable_memory,
                            enable_utilization,
                        );
                        exported_count += 1;
                    }
                    Err(e) => {
                        warn!("Failed to read GPU {}: {}", index, e);
                        state.health_stats.record_device_read_error();
                    }
                }
            }

            state.collect_success.set(1.0);
            state.health_stats.record_collect_success();
        }
        Err(e) => {
            // Keep serving: an empty device set with collect_success=0
            // lets the scraper alert on it.
            error!("Failed to enumerate GPUs: {}", e);
            state.collect_success.set(0.0);
            state.health_stats.record_collect_failure();
        }
    }

    state.devices_total.set(exported_count as f64);
    state
        .health_stats
        .record_collect(exported_count, collect_start.elapsed().as_secs_f64());

    // ========== PHASE 3: Encode and return metrics ==========
    let serialize_start = Instant::now();
    let families = state.registry.gather();

    let mut buffer = Vec::with_capacity(BUFFER_CAP);
    let encoder = TextEncoder::new();

    if encoder.encode(&families, &mut buffer).is_err() {
        error!("Failed to encode Prometheus metrics");
        return Err(MetricsError::EncodingFailed);
    }

    let serialization_ms = serialize_start.elapsed().as_secs_f64() * 1000.0;
    state
        .health_stats
        .record_serialization_duration_ms(serialization_ms);

    // Record response size
    let response_size_kb = buffer.len() as f64 / 1024.0;
    state
        .health_stats
        .record_metrics_response_size_kb(response_size_kb);

    // Count time series
    let time_series_count = families.iter().map(|f| f.get_metric().len()).sum::<usize>() as u64;
    state
        .health_stats
        .record_total_time_series(time_series_count);

    // Record metrics request statistics
    let request_duration_ms = start.elapsed().as_secs_f64() * 1000.0;
    state.health_stats.record_metrics_endpoint_call();
    state
        .health_stats
        .record_request_duration(request_duration_ms);
    state.health_stats.record_http_request();

    state.scrape_duration.set(start.elapsed().as_secs_f64());

    debug!(
        "Metrics request completed: {} devices, {} bytes, {:.3}ms",
        exported_count,
        buffer.len(),
        request_duration_ms
    );

    String::from_utf8(buffer).map_err(|_| MetricsError::EncodingFailed)
}
