//! Test command implementation.
//!
//! Tests metrics collection and displays results.

use std::time::Instant;

use crate::config::Config;
use crate::gpu::GpuReader;

/// Tests metrics collection.
pub fn command_test(
    iterations: usize,
    verbose: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🧪 Herakles GPU Exporter - Test Mode");
    println!("=====================================");

    let reader = GpuReader::new()?;

    for iteration in 1..=iterations {
        println!("\n🔄 Iteration {}/{}:", iteration, iterations);

        let start = Instant::now();
        let count = reader.device_count()?;
        println!("   📟 Found {} GPU(s)", count);

        let mut readings = reader.read_all()?;
        let error_count = count as usize - readings.len();

        if let Some(whitelist) = &config.devices {
            readings.retain(|r| whitelist.contains(&r.index));
        }

        if verbose {
            for reading in &readings {
                println!("   ├─ {} (GPU {})", reading.name, reading.index);
                println!("   │  ├─ UUID: {}", reading.uuid);
                println!("   │  ├─ Temperature: {:.0}°C", reading.temperature_celsius);
                println!(
                    "   │  ├─ Memory: {:.0}/{:.0} MiB used ({:.0} MiB free)",
                    reading.memory_used_mib, reading.memory_total_mib, reading.memory_free_mib
                );
                println!(
                    "   │  └─ Utilization: gpu {:.0}%, mem {:.0}%",
                    reading.gpu_utilization_percent, reading.memory_utilization_percent
                );
            }
        }

        let duration = start.elapsed();
        println!(
            "   ⏱️  Collection duration: {:.2}ms",
            duration.as_secs_f64() * 1000.0
        );
        println!("   📊 Successfully read: {} GPU(s)", readings.len());
        println!("   ❌ Errors: {}", error_count);

        if !readings.is_empty() {
            let total_mib: f64 = readings.iter().map(|r| r.memory_total_mib).sum();
            let used_mib: f64 = readings.iter().map(|r| r.memory_used_mib).sum();

            println!("   📈 Memory totals:");
            println!("      ├─ Total: {:.0} MiB", total_mib);
            println!("      └─ Used:  {:.0} MiB", used_mib);
        }
    }

    println!("\n✅ Test completed successfully");
    Ok(())
}
