//! Check command implementation.
//!
//! Validates NVML access and configuration.

use crate::config::{validate_effective_config, Config};
use crate::gpu::GpuReader;

/// Validates NVML access and configuration.
pub fn command_check(
    nvml: bool,
    devices: bool,
    all: bool,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("🔍 Herakles GPU Exporter - System Check");
    println!("========================================");

    let mut all_ok = true;
    let mut reader: Option<GpuReader> = None;

    // Check NVML initialization
    if nvml || devices || all {
        println!("\n🎛️  Checking NVML library...");
        match GpuReader::new() {
            Ok(r) => {
                println!("   ✅ NVML initialized");
                match r.driver_version() {
                    Ok(version) => println!("   ✅ Driver version: {}", version),
                    Err(e) => println!("   ⚠️  Could not read driver version: {}", e),
                }
                match r.nvml_version() {
                    Ok(version) => println!("   ✅ NVML version: {}", version),
                    Err(e) => println!("   ⚠️  Could not read NVML version: {}", e),
                }
                reader = Some(r);
            }
            Err(e) => {
                println!("   ❌ NVML initialization failed: {}", e);
                all_ok = false;
            }
        }
    }

    // Check per-device telemetry reads
    if devices || all {
        println!("\n📟 Checking device telemetry...");
        if let Some(reader) = &reader {
            match reader.device_count() {
                Ok(0) => {
                    println!("   ⚠️  No GPUs enumerated - metric set will be empty");
                }
                Ok(count) => {
                    println!("   ✅ {} GPU(s) enumerated", count);
                    for index in 0..count {
                        match reader.read_device(index) {
                            Ok(reading) => {
                                println!(
                                    "   ✅ GPU {}: {} ({:.0} MiB, {:.0}°C)",
                                    index,
                                    reading.name,
                                    reading.memory_total_mib,
                                    reading.temperature_celsius
                                );
                            }
                            Err(e) => {
                                println!("   ❌ GPU {}: {}", index, e);
                                all_ok = false;
                            }
                        }
                    }
                }
                Err(e) => {
                    println!("   ❌ Device enumeration failed: {}", e);
                    all_ok = false;
                }
            }
        } else {
            println!("   ❌ Skipped - NVML unavailable");
            all_ok = false;
        }
    }

    // Check configuration
    println!("\n⚙️  Checking configuration...");
    match validate_effective_config(config) {
        Ok(_) => {
            println!("   ✅ Configuration is valid");
        }
        Err(e) => {
            println!("   ❌ Configuration invalid: {}", e);
            all_ok = false;
        }
    }

    println!("\n📋 Summary:");
    if all_ok {
        println!("   ✅ All checks passed - system is ready");
        Ok(())
    } else {
        println!("   ❌ Some checks failed - please review warnings");
        std::process::exit(1);
    }
}
