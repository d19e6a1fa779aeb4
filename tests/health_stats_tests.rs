//! Integration tests for health stats module.
//!
//! These tests verify that the HealthStats structure correctly tracks
//! and reports collection outcomes, NVML error counts, and HTTP request
//! statistics.

use herakles_gpu_exporter::health_stats::HealthStats;
use std::sync::atomic::Ordering;

#[test]
fn test_health_stats_fields_initialize() {
    let stats = HealthStats::new();

    let (dv_cur, dv_avg, _dv_max, _dv_min, dv_count) = stats.devices_seen.snapshot();
    assert_eq!(dv_count, 0);
    assert_eq!(dv_cur, 0.0);
    assert_eq!(dv_avg, 0.0);

    let (cd_cur, _, _, _, cd_count) = stats.collect_duration_seconds.snapshot();
    assert_eq!(cd_count, 0);
    assert_eq!(cd_cur, 0.0);

    assert_eq!(stats.total_collects.load(Ordering::Relaxed), 0);
    assert_eq!(stats.collect_success_count.load(Ordering::Relaxed), 0);
    assert_eq!(stats.collect_failure_count.load(Ordering::Relaxed), 0);
    assert_eq!(stats.device_read_errors.load(Ordering::Relaxed), 0);
    assert_eq!(stats.metrics_endpoint_calls.load(Ordering::Relaxed), 0);

    // No scrape yet: healthy by default
    assert!(stats.last_collect_ok());
    assert_eq!(stats.get_collect_success_rate(), 100.0);
    assert_eq!(stats.get_last_collect_time_str(), "N/A");
}

#[test]
fn test_record_collect_updates_stats() {
    let stats = HealthStats::new();

    stats.record_collect(4, 0.012);
    stats.record_collect(2, 0.020);

    let (dv_cur, dv_avg, dv_max, dv_min, dv_count) = stats.devices_seen.snapshot();
    assert_eq!(dv_count, 2);
    assert_eq!(dv_cur, 2.0);
    assert_eq!(dv_avg, 3.0);
    assert_eq!(dv_max, 4.0);
    assert_eq!(dv_min, 2.0);

    assert_eq!(stats.total_collects.load(Ordering::Relaxed), 2);
    assert_ne!(stats.get_last_collect_time_str(), "N/A");
}

#[test]
fn test_collect_outcome_tracking() {
    let stats = HealthStats::new();

    stats.record_collect_success();
    stats.record_collect_success();
    stats.record_collect_success();
    stats.record_collect_failure();

    assert_eq!(stats.collect_success_count.load(Ordering::Relaxed), 3);
    assert_eq!(stats.collect_failure_count.load(Ordering::Relaxed), 1);
    assert_eq!(stats.get_collect_success_rate(), 75.0);

    // Most recent outcome wins
    assert!(!stats.last_collect_ok());
    stats.record_collect_success();
    assert!(stats.last_collect_ok());
}

#[test]
fn test_device_read_error_counter() {
    let stats = HealthStats::new();

    stats.record_device_read_error();
    stats.record_device_read_error();

    assert_eq!(stats.device_read_errors.load(Ordering::Relaxed), 2);
    // Read errors alone don't flip overall health
    assert!(stats.last_collect_ok());
}

#[test]
fn test_http_request_tracking() {
    let stats = HealthStats::new();

    stats.record_http_request();
    stats.record_http_request();
    stats.record_metrics_endpoint_call();
    stats.record_request_duration(4.2);

    assert_eq!(stats.http_request_timestamps.count_last_minute(), 2);
    assert_eq!(stats.metrics_endpoint_calls.load(Ordering::Relaxed), 1);

    let (rd_cur, _, _, _, rd_count) = stats.request_duration_ms.snapshot();
    assert_eq!(rd_count, 1);
    assert_eq!(rd_cur, 4.2);
}

#[test]
fn test_render_table_contains_sections() {
    let stats = HealthStats::new();
    stats.record_collect(1, 0.005);
    stats.record_collect_success();

    let table = stats.render_table();
    assert!(table.contains("COLLECTION PERFORMANCE"));
    assert!(table.contains("HTTP SERVER"));
    assert!(table.contains("devices_seen"));
    assert!(table.contains("device_read_errors"));
}
