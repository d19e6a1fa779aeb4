//! Devices endpoint handler.
//!
//! This module provides the `/devices` endpoint handler that lists the
//! currently enumerated GPUs with their identity and memory footprint.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument, warn};

use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the /devices endpoint.
#[instrument(skip(state))]
pub async fn devices_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /devices request");

    // Track HTTP request
    state.health_stats.record_http_request();

    let mut out = String::new();

    writeln!(out, "HERAKLES GPU EXPORTER - DEVICES").ok();
    writeln!(out, "===============================").ok();
    writeln!(out).ok();

    if let Ok(driver) = state.reader.driver_version() {
        writeln!(out, "Driver version: {}", driver).ok();
    }
    if let Ok(nvml) = state.reader.nvml_version() {
        writeln!(out, "NVML version:   {}", nvml).ok();
    }
    writeln!(out).ok();

    match state.reader.device_count() {
        Ok(count) => {
            writeln!(
                out,
                "{:>7} | {:30} | {:42} | {:>12}",
                "gpu_seq", "name", "uuid", "memory (MiB)"
            )
            .ok();
            writeln!(out, "{}", "-".repeat(100)).ok();

            for index in 0..count {
                match state.reader.read_device(index) {
                    Ok(reading) => {
                        writeln!(
                            out,
                            "{:>7} | {:30} | {:42} | {:>12.0}",
                            reading.index, reading.name, reading.uuid, reading.memory_total_mib
                        )
                        .ok();
                    }
                    Err(e) => {
                        warn!("Failed to read GPU {}: {}", index, e);
                        writeln!(out, "{:>7} | unavailable: {}", index, e).ok();
                    }
                }
            }

            writeln!(out).ok();
            writeln!(out, "Total: {} devices", count).ok();
        }
        Err(e) => {
            writeln!(out, "❌ Failed to enumerate GPUs: {}", e).ok();
        }
    }

    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        out,
    )
}
