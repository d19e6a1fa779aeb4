//! Integration tests for the GPU gauge families.
//!
//! These tests drive `GpuMetrics` with synthetic device readings and verify
//! the scrape-level properties: N devices produce exactly N samples per
//! family, zero devices produce an empty set, and resetting clears stale
//! label sets.

use herakles_gpu_exporter::gpu::DeviceReading;
use herakles_gpu_exporter::metrics::GpuMetrics;
use prometheus::proto::MetricFamily;
use prometheus::Registry;

/// All device-level family names in exposition order.
const FAMILY_NAMES: [&str; 6] = [
    "gpu_temperature",
    "gpu_memory_total",
    "gpu_memory_used",
    "gpu_memory_free",
    "mem_utilization",
    "gpu_utilization",
];

fn synthetic_reading(index: u32) -> DeviceReading {
    DeviceReading {
        index,
        name: format!("NVIDIA GeForce RTX 3080 #{}", index),
        uuid: format!("GPU-00000000-0000-0000-0000-{:012}", index),
        temperature_celsius: 55.0 + index as f64,
        memory_total_mib: 10240.0,
        memory_used_mib: 2048.0,
        memory_free_mib: 8192.0,
        gpu_utilization_percent: 37.0,
        memory_utilization_percent: 12.0,
    }
}

fn sample_count(families: &[MetricFamily], name: &str) -> usize {
    families
        .iter()
        .find(|f| f.get_name() == name)
        .map(|f| f.get_metric().len())
        .unwrap_or(0)
}

#[test]
fn test_n_devices_yield_n_samples_per_family() {
    let registry = Registry::new();
    let metrics = GpuMetrics::new(&registry).unwrap();

    for index in 0..4 {
        metrics.record_reading(&synthetic_reading(index), true, true, true);
    }

    let families = registry.gather();
    for name in FAMILY_NAMES {
        assert_eq!(
            sample_count(&families, name),
            4,
            "expected 4 samples for {}",
            name
        );
    }
}

#[test]
fn test_zero_devices_yield_empty_set() {
    let registry = Registry::new();
    let _metrics = GpuMetrics::new(&registry).unwrap();

    let families = registry.gather();
    for name in FAMILY_NAMES {
        assert_eq!(
            sample_count(&families, name),
            0,
            "expected no samples for {}",
            name
        );
    }
}

#[test]
fn test_reset_clears_stale_devices() {
    let registry = Registry::new();
    let metrics = GpuMetrics::new(&registry).unwrap();

    for index in 0..3 {
        metrics.record_reading(&synthetic_reading(index), true, true, true);
    }
    assert_eq!(sample_count(&registry.gather(), "gpu_temperature"), 3);

    // A device disappeared between scrapes
    metrics.reset_device_metrics();
    for index in 0..2 {
        metrics.record_reading(&synthetic_reading(index), true, true, true);
    }

    let families = registry.gather();
    for name in FAMILY_NAMES {
        assert_eq!(
            sample_count(&families, name),
            2,
            "expected stale samples cleared for {}",
            name
        );
    }
}

#[test]
fn test_disabled_families_are_not_recorded() {
    let registry = Registry::new();
    let metrics = GpuMetrics::new(&registry).unwrap();

    metrics.record_reading(&synthetic_reading(0), true, false, false);

    let families = registry.gather();
    assert_eq!(sample_count(&families, "gpu_temperature"), 1);
    assert_eq!(sample_count(&families, "gpu_memory_total"), 0);
    assert_eq!(sample_count(&families, "gpu_memory_used"), 0);
    assert_eq!(sample_count(&families, "gpu_memory_free"), 0);
    assert_eq!(sample_count(&families, "mem_utilization"), 0);
    assert_eq!(sample_count(&families, "gpu_utilization"), 0);
}

#[test]
fn test_sample_carries_device_identity_labels() {
    let registry = Registry::new();
    let metrics = GpuMetrics::new(&registry).unwrap();

    let reading = synthetic_reading(1);
    metrics.record_reading(&reading, true, true, true);

    let families = registry.gather();
    let family = families
        .iter()
        .find(|f| f.get_name() == "gpu_temperature")
        .unwrap();
    let metric = &family.get_metric()[0];

    let mut labels: Vec<(&str, &str)> = metric
        .get_label()
        .iter()
        .map(|l| (l.get_name(), l.get_value()))
        .collect();
    labels.sort();

    assert_eq!(
        labels,
        vec![
            ("gpu_seq", "1"),
            ("name", reading.name.as_str()),
            ("uuid", reading.uuid.as_str()),
        ]
    );
    assert_eq!(metric.get_gauge().value(), 56.0);
}

#[test]
fn test_memory_values_are_not_cross_checked() {
    // total >= used + free is NOT an invariant of the data source;
    // inconsistent readings must be exported as-is.
    let registry = Registry::new();
    let metrics = GpuMetrics::new(&registry).unwrap();

    let reading = DeviceReading {
        memory_total_mib: 1000.0,
        memory_used_mib: 800.0,
        memory_free_mib: 400.0,
        ..synthetic_reading(0)
    };
    metrics.record_reading(&reading, true, true, true);

    let families = registry.gather();
    let value_of = |name: &str| {
        families
            .iter()
            .find(|f| f.get_name() == name)
            .map(|f| f.get_metric()[0].get_gauge().value())
            .unwrap()
    };

    assert_eq!(value_of("gpu_memory_total"), 1000.0);
    assert_eq!(value_of("gpu_memory_used"), 800.0);
    assert_eq!(value_of("gpu_memory_free"), 400.0);
}
