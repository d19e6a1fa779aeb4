//! Health statistics and monitoring for the exporter.
//!
//! This module provides types and functionality for tracking exporter health,
//! including collection performance, NVML error counts, and HTTP request
//! statistics.

use std::collections::VecDeque;
use std::fmt::Write as FmtWrite;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, RwLock as StdRwLock};
use std::time::{Instant, SystemTime};

/// Running statistics for a single metric.
#[derive(Clone, Copy, Default)]
pub struct RunningStat {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    last: f64,
}

impl RunningStat {
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
            self.last = value;
            self.sum = value;
            self.count = 1;
            return;
        }
        self.count += 1;
        self.sum += value;
        self.last = value;
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
    }

    pub fn avg(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / (self.count as f64)
        }
    }
}

/// Thread-safe wrapper for running statistics.
#[derive(Default)]
pub struct Stat {
    inner: Mutex<RunningStat>,
}

impl Stat {
    pub fn add_sample(&self, value: f64) {
        if let Ok(mut s) = self.inner.lock() {
            s.add(value);
        }
    }

    pub fn snapshot(&self) -> (f64, f64, f64, f64, u64) {
        if let Ok(s) = self.inner.lock() {
            (s.last, s.avg(), s.max, s.min, s.count)
        } else {
            (0.0, 0.0, 0.0, 0.0, 0)
        }
    }
}

/// Thread-safe circular buffer for tracking HTTP request timestamps.
pub struct RequestTimestamps {
    inner: Mutex<VecDeque<Instant>>,
}

impl Default for RequestTimestamps {
    fn default() -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(1024)),
        }
    }
}

impl RequestTimestamps {
    pub fn record(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.push_back(Instant::now());
            // Keep only last 10 minutes of timestamps to avoid unbounded growth
            let cutoff = Instant::now() - std::time::Duration::from_secs(600);
            while guard.front().is_some_and(|&t| t < cutoff) {
                guard.pop_front();
            }
        }
    }

    pub fn count_last_minute(&self) -> u64 {
        if let Ok(guard) = self.inner.lock() {
            let cutoff = Instant::now() - std::time::Duration::from_secs(60);
            guard.iter().filter(|&&t| t >= cutoff).count() as u64
        } else {
            0
        }
    }
}

/// Exporter-internal health statistics.
pub struct HealthStats {
    // Collection performance
    pub total_collects: AtomicU64,
    pub collect_success_count: AtomicU64,
    pub collect_failure_count: AtomicU64,
    pub devices_seen: Stat,
    pub collect_duration_seconds: Stat,

    // NVML error tracking
    pub device_read_errors: AtomicU64,

    // HTTP server stats
    pub http_request_timestamps: RequestTimestamps,
    pub request_duration_ms: Stat,
    pub serialization_duration_ms: Stat,
    pub metrics_response_size_kb: Stat,
    pub total_time_series: Stat,
    pub metrics_endpoint_calls: AtomicU64,

    // Timing
    pub start_time: Instant,
    pub last_collect_time: StdRwLock<Option<Instant>>,
    last_collect_ok: AtomicBool,
}

impl Default for HealthStats {
    fn default() -> Self {
        Self {
            total_collects: AtomicU64::new(0),
            collect_success_count: AtomicU64::new(0),
            collect_failure_count: AtomicU64::new(0),
            devices_seen: Stat::default(),
            collect_duration_seconds: Stat::default(),
            device_read_errors: AtomicU64::new(0),
            http_request_timestamps: RequestTimestamps::default(),
            request_duration_ms: Stat::default(),
            serialization_duration_ms: Stat::default(),
            metrics_response_size_kb: Stat::default(),
            total_time_series: Stat::default(),
            metrics_endpoint_calls: AtomicU64::new(0),
            start_time: Instant::now(),
            last_collect_time: StdRwLock::new(None),
            last_collect_ok: AtomicBool::new(true),
        }
    }
}

impl HealthStats {
    pub fn new() -> Self {
        Default::default()
    }

    /// Records one completed collection pass over all devices.
    pub fn record_collect(&self, devices: u64, collect_duration_seconds: f64) {
        self.devices_seen.add_sample(devices as f64);
        self.collect_duration_seconds
            .add_sample(collect_duration_seconds);
        self.total_collects.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut guard) = self.last_collect_time.write() {
            *guard = Some(Instant::now());
        }
    }

    pub fn record_collect_success(&self) {
        self.collect_success_count.fetch_add(1, Ordering::Relaxed);
        self.last_collect_ok.store(true, Ordering::Relaxed);
    }

    pub fn record_collect_failure(&self) {
        self.collect_failure_count.fetch_add(1, Ordering::Relaxed);
        self.last_collect_ok.store(false, Ordering::Relaxed);
    }

    pub fn record_device_read_error(&self) {
        self.device_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_http_request(&self) {
        self.http_request_timestamps.record();
    }

    pub fn record_request_duration(&self, duration_ms: f64) {
        self.request_duration_ms.add_sample(duration_ms);
    }

    pub fn record_serialization_duration_ms(&self, duration_ms: f64) {
        self.serialization_duration_ms.add_sample(duration_ms);
    }

    pub fn record_metrics_response_size_kb(&self, size_kb: f64) {
        self.metrics_response_size_kb.add_sample(size_kb);
    }

    pub fn record_total_time_series(&self, count: u64) {
        self.total_time_series.add_sample(count as f64);
    }

    pub fn record_metrics_endpoint_call(&self) {
        self.metrics_endpoint_calls.fetch_add(1, Ordering::Relaxed);
    }

    /// Whether the most recent device enumeration succeeded.
    /// Defaults to true before the first scrape.
    pub fn last_collect_ok(&self) -> bool {
        self.last_collect_ok.load(Ordering::Relaxed)
    }

    pub fn get_collect_success_rate(&self) -> f64 {
        let success = self.collect_success_count.load(Ordering::Relaxed);
        let failure = self.collect_failure_count.load(Ordering::Relaxed);
        let total = success + failure;
        if total == 0 {
            100.0
        } else {
            (success as f64 / total as f64) * 100.0
        }
    }

    pub fn get_uptime_hours(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() / 3600.0
    }

    pub fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn get_last_collect_time_str(&self) -> String {
        // Time constants for formatting
        const SECS_PER_DAY: u64 = 86400;
        const SECS_PER_HOUR: u64 = 3600;
        const SECS_PER_MINUTE: u64 = 60;

        if let Ok(guard) = self.last_collect_time.read() {
            if let Some(last_collect) = *guard {
                // Calculate time since epoch by using SystemTime
                let elapsed_since_collect = last_collect.elapsed();
                let now = SystemTime::now();
                if let Ok(duration) = now.duration_since(SystemTime::UNIX_EPOCH) {
                    let collect_time_secs = duration
                        .as_secs()
                        .saturating_sub(elapsed_since_collect.as_secs());
                    let hours = (collect_time_secs % SECS_PER_DAY) / SECS_PER_HOUR;
                    let minutes = (collect_time_secs % SECS_PER_HOUR) / SECS_PER_MINUTE;
                    let seconds = collect_time_secs % SECS_PER_MINUTE;
                    return format!("{:02}:{:02}:{:02}", hours, minutes, seconds);
                }
            }
        }
        "N/A".to_string()
    }

    pub fn render_table(&self) -> String {
        let (dv_cur, dv_avg, dv_max, dv_min, _) = self.devices_seen.snapshot();
        let (cd_cur, cd_avg, cd_max, cd_min, _) = self.collect_duration_seconds.snapshot();
        let (rd_cur, rd_avg, rd_max, rd_min, _) = self.request_duration_ms.snapshot();
        let (se_cur, se_avg, se_max, se_min, _) = self.serialization_duration_ms.snapshot();
        let (sz_cur, sz_avg, sz_max, sz_min, _) = self.metrics_response_size_kb.snapshot();
        let (ts_cur, ts_avg, ts_max, ts_min, _) = self.total_time_series.snapshot();

        let total = self.total_collects.load(Ordering::Relaxed);
        let read_errors = self.device_read_errors.load(Ordering::Relaxed);
        let collect_success_rate = self.get_collect_success_rate();
        let http_requests_last_minute = self.http_request_timestamps.count_last_minute();
        let metrics_calls = self.metrics_endpoint_calls.load(Ordering::Relaxed);
        let uptime_hours = self.get_uptime_hours();
        let last_collect = self.get_last_collect_time_str();

        let left_col = 26usize;
        let col_w = 12usize;

        let mut out = String::new();

        writeln!(out, "HEALTH ENDPOINT - EXPORTER INTERNAL STATS").ok();
        writeln!(out, "==========================================").ok();
        writeln!(out).ok();

        // Header
        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "",
            "current",
            "average",
            "max",
            "min",
            left = left_col,
            col = col_w
        )
        .ok();

        // COLLECTION PERFORMANCE section
        writeln!(out).ok();
        writeln!(out, "COLLECTION PERFORMANCE").ok();
        writeln!(out, "----------------------").ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "devices_seen",
            format!("{:.0}", dv_cur),
            format!("{:.1}", dv_avg),
            format!("{:.0}", dv_max),
            format!("{:.0}", dv_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "collect_duration (s)",
            format!("{:.3}", cd_cur),
            format!("{:.3}", cd_avg),
            format!("{:.3}", cd_max),
            format!("{:.3}", cd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "collect_success_rate (%)",
            format!("{:.1}", collect_success_rate),
            format!("{:.1}", collect_success_rate),
            format!("{:.1}", collect_success_rate),
            format!("{:.1}", collect_success_rate),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "total_collects",
            format!("{}", total),
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "device_read_errors",
            format!("{}", read_errors),
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "last_collect (UTC)",
            last_collect,
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        // HTTP SERVER section
        writeln!(out).ok();
        writeln!(out, "HTTP SERVER").ok();
        writeln!(out, "-----------").ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "http_requests_last_minute",
            format!("{}", http_requests_last_minute),
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "avg_request_duration (ms)",
            format!("{:.1}", rd_cur),
            format!("{:.1}", rd_avg),
            format!("{:.1}", rd_max),
            format!("{:.1}", rd_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "metrics_endpoint_calls",
            format!("{}", metrics_calls),
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "serialization (ms)",
            format!("{:.2}", se_cur),
            format!("{:.2}", se_avg),
            format!("{:.2}", se_max),
            format!("{:.2}", se_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "metrics_response_size (KB)",
            format!("{:.1}", sz_cur),
            format!("{:.1}", sz_avg),
            format!("{:.1}", sz_max),
            format!("{:.1}", sz_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "total_time_series",
            format!("{:.0}", ts_cur),
            format!("{:.1}", ts_avg),
            format!("{:.0}", ts_max),
            format!("{:.0}", ts_min),
            left = left_col,
            col = col_w
        )
        .ok();

        writeln!(
            out,
            "{:left$} | {:^col$} | {:^col$} | {:^col$} | {:^col$}",
            "uptime (h)",
            format!("{:.2}", uptime_hours),
            "N/A",
            "N/A",
            "N/A",
            left = left_col,
            col = col_w
        )
        .ok();

        out
    }
}
