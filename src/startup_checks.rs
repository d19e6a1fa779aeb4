//! Startup requirement validation for herakles-gpu-exporter.
//!
//! This module validates that an NVIDIA driver and the NVML shared library
//! appear to be present before the exporter starts serving.

use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Well-known locations of the NVML shared library.
const NVML_LIBRARY_PATHS: [&str; 4] = [
    "/usr/lib/x86_64-linux-gnu/libnvidia-ml.so.1",
    "/usr/lib64/libnvidia-ml.so.1",
    "/usr/lib/libnvidia-ml.so.1",
    "/opt/nvidia/lib64/libnvidia-ml.so.1",
];

/// Validate all runtime requirements
pub fn validate_requirements() -> Result<(), ValidationError> {
    info!("🔍 Validating runtime requirements...");

    check_driver_present()?;
    check_nvml_library();

    info!("✅ All runtime requirements validated");
    Ok(())
}

/// Check that the NVIDIA kernel driver is loaded
fn check_driver_present() -> Result<(), ValidationError> {
    let version_file = "/proc/driver/nvidia/version";

    match fs::read_to_string(version_file) {
        Ok(content) => {
            if let Some(line) = content.lines().next() {
                info!("✅ NVIDIA driver loaded: {}", line.trim());
            } else {
                info!("✅ NVIDIA driver loaded");
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            error!("❌ {} not found - no NVIDIA kernel driver loaded", version_file);
            error!("   NVML initialization will fail without a driver.");
            error!("");
            error!("   Solutions:");
            error!("   1. Install the NVIDIA driver package for your distribution");
            error!("   2. In containers, run with the NVIDIA container runtime");
            Err(ValidationError::DriverNotLoaded)
        }
        Err(e) => {
            warn!("⚠️  Could not check {}: {}", version_file, e);
            Ok(()) // Continue but warn
        }
    }
}

/// Check that the NVML shared library can be found
fn check_nvml_library() {
    for path in NVML_LIBRARY_PATHS {
        if Path::new(path).exists() {
            info!("✅ NVML library found at {}", path);
            return;
        }
    }

    // The dynamic loader may still find it via ldconfig; not fatal.
    warn!("⚠️  NVML library not found in well-known locations");
    warn!("   If startup fails, check that libnvidia-ml.so.1 is installed");
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("NVIDIA kernel driver not loaded (/proc/driver/nvidia/version missing)")]
    DriverNotLoaded,
}
