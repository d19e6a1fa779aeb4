//! Configuration display endpoint handler.
//!
//! This module provides the `/config` endpoint handler that displays
//! the current exporter configuration.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::fmt::Write as FmtWrite;
use tracing::{debug, instrument};

use crate::config::{DEFAULT_BIND_ADDR, DEFAULT_PORT};
use crate::handlers::health::FOOTER_TEXT;
use crate::state::SharedState;

/// Handler for the /config endpoint.
#[instrument(skip(state))]
pub async fn config_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!("Processing /config request");

    // Track HTTP request
    state.health_stats.record_http_request();

    let cfg = &state.config;

    let mut out = String::new();

    writeln!(out, "HERAKLES GPU EXPORTER - CONFIGURATION").ok();
    writeln!(out, "=====================================").ok();
    writeln!(out).ok();

    writeln!(out, "SERVER CONFIGURATION").ok();
    writeln!(out, "--------------------").ok();
    writeln!(
        out,
        "bind:                       {}",
        cfg.bind.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    )
    .ok();
    writeln!(
        out,
        "port:                       {}",
        cfg.port.unwrap_or(DEFAULT_PORT)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "DEVICE SELECTION").ok();
    writeln!(out, "----------------").ok();
    writeln!(
        out,
        "devices:                    {}",
        cfg.devices
            .as_ref()
            .map(|v| v
                .iter()
                .map(|i| i.to_string())
                .collect::<Vec<_>>()
                .join(", "))
            .unwrap_or_else(|| "all".to_string())
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "METRICS FLAGS").ok();
    writeln!(out, "-------------").ok();
    writeln!(
        out,
        "enable_temperature:         {}",
        cfg.enable_temperature.unwrap_or(true)
    )
    .ok();
    writeln!(
        out,
        "enable_memory:              {}",
        cfg.enable_memory.unwrap_or(true)
    )
    .ok();
    writeln!(
        out,
        "enable_utilization:         {}",
        cfg.enable_utilization.unwrap_or(true)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "FEATURE FLAGS").ok();
    writeln!(out, "-------------").ok();
    writeln!(
        out,
        "enable_health:              {}",
        cfg.enable_health.unwrap_or(true)
    )
    .ok();
    writeln!(
        out,
        "enable_telemetry:           {}",
        cfg.enable_telemetry.unwrap_or(true)
    )
    .ok();
    writeln!(out).ok();

    writeln!(out, "LOGGING").ok();
    writeln!(out, "-------").ok();
    writeln!(
        out,
        "log_level:                  {}",
        cfg.log_level.as_deref().unwrap_or("info")
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{FOOTER_TEXT}").ok();

    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        out,
    )
}
