//! Prometheus metric definitions for herakles-gpu-exporter.
//!
//! One gauge family per exported GPU scalar. Families carry the device
//! identity as labels (gpu_seq, name, uuid) so every enumerated device
//! contributes exactly one sample per family and scrape.

use prometheus::{GaugeVec, Opts, Registry};

use crate::gpu::DeviceReading;

/// Label keys shared by all device-level gauge families.
const DEVICE_LABELS: [&str; 3] = ["gpu_seq", "name", "uuid"];

/// Collection of per-device gauge families.
#[derive(Clone)]
pub struct GpuMetrics {
    pub gpu_temperature: GaugeVec,
    pub gpu_memory_total: GaugeVec,
    pub gpu_memory_used: GaugeVec,
    pub gpu_memory_free: GaugeVec,
    pub mem_utilization: GaugeVec,
    pub gpu_utilization: GaugeVec,
}

impl GpuMetrics {
    /// Creates and registers all gauge families with the registry.
    pub fn new(registry: &Registry) -> Result<Self, Box<dyn std::error::Error>> {
        let gpu_temperature = GaugeVec::new(
            Opts::new("gpu_temperature", "Shows gpu temperature (C)"),
            &DEVICE_LABELS,
        )?;
        let gpu_memory_total = GaugeVec::new(
            Opts::new("gpu_memory_total", "Shows gpu memory total (MiB)"),
            &DEVICE_LABELS,
        )?;
        let gpu_memory_used = GaugeVec::new(
            Opts::new("gpu_memory_used", "Shows gpu memory used (MiB)"),
            &DEVICE_LABELS,
        )?;
        let gpu_memory_free = GaugeVec::new(
            Opts::new("gpu_memory_free", "Shows gpu memory free (MiB)"),
            &DEVICE_LABELS,
        )?;
        let mem_utilization = GaugeVec::new(
            Opts::new("mem_utilization", "Shows mem utilization (%)"),
            &DEVICE_LABELS,
        )?;
        let gpu_utilization = GaugeVec::new(
            Opts::new("gpu_utilization", "Shows gpu utilization (%)"),
            &DEVICE_LABELS,
        )?;

        registry.register(Box::new(gpu_temperature.clone()))?;
        registry.register(Box::new(gpu_memory_total.clone()))?;
        registry.register(Box::new(gpu_memory_used.clone()))?;
        registry.register(Box::new(gpu_memory_free.clone()))?;
        registry.register(Box::new(mem_utilization.clone()))?;
        registry.register(Box::new(gpu_utilization.clone()))?;

        Ok(Self {
            gpu_temperature,
            gpu_memory_total,
            gpu_memory_used,
            gpu_memory_free,
            mem_utilization,
            gpu_utilization,
        })
    }

    /// Clears all device label sets.
    ///
    /// Called before repopulating a scrape so devices that disappeared since
    /// the previous scrape don't leave stale samples behind.
    pub fn reset_device_metrics(&self) {
        self.gpu_temperature.reset();
        self.gpu_memory_total.reset();
        self.gpu_memory_used.reset();
        self.gpu_memory_free.reset();
        self.mem_utilization.reset();
        self.gpu_utilization.reset();
    }

    /// Records one device reading across all enabled families.
    pub fn record_reading(
        &self,
        reading: &DeviceReading,
        enable_temperature: bool,
        enable_memory: bool,
        enable_utilization: bool,
    ) {
        let seq = reading.index.to_string();
        let labels = [seq.as_str(), reading.name.as_str(), reading.uuid.as_str()];

        if enable_temperature {
            self.gpu_temperature
                .with_label_values(&labels)
                .set(reading.temperature_celsius);
        }

        if enable_memory {
            self.gpu_memory_total
                .with_label_values(&labels)
                .set(reading.memory_total_mib);
            self.gpu_memory_used
                .with_label_values(&labels)
                .set(reading.memory_used_mib);
            self.gpu_memory_free
                .with_label_values(&labels)
                .set(reading.memory_free_mib);
        }

        if enable_utilization {
            self.mem_utilization
                .with_label_values(&labels)
                .set(reading.memory_utilization_percent);
            self.gpu_utilization
                .with_label_values(&labels)
                .set(reading.gpu_utilization_percent);
        }
    }
}
