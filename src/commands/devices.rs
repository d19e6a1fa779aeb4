//! Devices command implementation.
//!
//! Lists detected GPUs with their identity.

use crate::gpu::GpuReader;

/// Lists detected GPUs (ignores the configured device whitelist intentionally).
pub fn command_devices(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("📟 Herakles GPU Exporter - Detected GPUs");
    println!("=========================================");

    let reader = GpuReader::new()?;

    if verbose {
        match reader.driver_version() {
            Ok(version) => println!("\n🎛️  Driver version: {}", version),
            Err(e) => println!("\n⚠️  Could not read driver version: {}", e),
        }
        match reader.nvml_version() {
            Ok(version) => println!("🎛️  NVML version:   {}", version),
            Err(e) => println!("⚠️  Could not read NVML version: {}", e),
        }
    }

    let count = reader.device_count()?;

    for index in 0..count {
        match reader.device_info(index) {
            Ok(info) => {
                println!("\n🏷️  GPU {}: {}", info.index, info.name);
                println!("   └─ UUID: {}", info.uuid);
            }
            Err(e) => {
                println!("\n❌ GPU {}: {}", index, e);
            }
        }
    }

    println!("\n📋 Total: {} GPU(s)", count);

    Ok(())
}
