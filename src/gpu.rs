//! NVML device reader for GPU telemetry.
//!
//! This module wraps the NVIDIA Management Library behind a single
//! process-wide handle. The handle is opened once at startup and reused for
//! every scrape; device handles are re-opened per read because device
//! indexes are only stable within one driver session.

use nvml_wrapper::enum_wrappers::device::TemperatureSensor;
use nvml_wrapper::error::NvmlError;
use nvml_wrapper::Nvml;
use tracing::warn;

/// Bytes per mebibyte, for converting NVML memory counters.
pub const BYTES_PER_MIB: u64 = 1024 * 1024;

/// Errors surfaced by the device reader.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("Failed to initialize NVML: {0}")]
    Init(#[source] NvmlError),

    #[error("Failed to enumerate devices: {0}")]
    Enumeration(#[source] NvmlError),

    #[error("Failed to read {field}: {source}")]
    Library {
        field: &'static str,
        #[source]
        source: NvmlError,
    },

    #[error("Device {index} is unavailable: {source}")]
    DeviceUnavailable {
        index: u32,
        #[source]
        source: NvmlError,
    },

    #[error("Failed to read {field} for device {index}: {source}")]
    ReadFailed {
        index: u32,
        field: &'static str,
        #[source]
        source: NvmlError,
    },
}

/// Identity of one enumerated GPU.
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub index: u32,
    pub name: String,
    pub uuid: String,
}

/// One full set of scalar readings from a single GPU.
///
/// Memory values are in MiB with truncating division, utilization values are
/// percentages as reported by the driver. Nothing here is cached; a reading
/// only describes the device at the moment it was taken.
#[derive(Debug, Clone)]
pub struct DeviceReading {
    pub index: u32,
    pub name: String,
    pub uuid: String,
    pub temperature_celsius: f64,
    pub memory_total_mib: f64,
    pub memory_used_mib: f64,
    pub memory_free_mib: f64,
    pub gpu_utilization_percent: f64,
    pub memory_utilization_percent: f64,
}

/// Process-wide NVML handle.
pub struct GpuReader {
    nvml: Nvml,
}

impl GpuReader {
    /// Opens the NVML library. Fails if no NVIDIA driver is loaded.
    pub fn new() -> Result<Self, GpuError> {
        let nvml = Nvml::init().map_err(GpuError::Init)?;
        Ok(Self { nvml })
    }

    /// Number of GPUs visible to the driver.
    pub fn device_count(&self) -> Result<u32, GpuError> {
        self.nvml.device_count().map_err(GpuError::Enumeration)
    }

    /// Name and UUID of the device at `index`.
    pub fn device_info(&self, index: u32) -> Result<DeviceInfo, GpuError> {
        let device = self
            .nvml
            .device_by_index(index)
            .map_err(|source| GpuError::DeviceUnavailable { index, source })?;

        let name = device.name().map_err(|source| GpuError::ReadFailed {
            index,
            field: "name",
            source,
        })?;
        let uuid = device.uuid().map_err(|source| GpuError::ReadFailed {
            index,
            field: "uuid",
            source,
        })?;

        Ok(DeviceInfo { index, name, uuid })
    }

    /// Reads the full set of scalar telemetry from the device at `index`.
    ///
    /// One device handle open per call; all fields are read through it.
    pub fn read_device(&self, index: u32) -> Result<DeviceReading, GpuError> {
        let device = self
            .nvml
            .device_by_index(index)
            .map_err(|source| GpuError::DeviceUnavailable { index, source })?;

        let name = device.name().map_err(|source| GpuError::ReadFailed {
            index,
            field: "name",
            source,
        })?;
        let uuid = device.uuid().map_err(|source| GpuError::ReadFailed {
            index,
            field: "uuid",
            source,
        })?;
        let temperature =
            device
                .temperature(TemperatureSensor::Gpu)
                .map_err(|source| GpuError::ReadFailed {
                    index,
                    field: "temperature",
                    source,
                })?;
        let memory = device
            .memory_info()
            .map_err(|source| GpuError::ReadFailed {
                index,
                field: "memory info",
                source,
            })?;
        let utilization =
            device
                .utilization_rates()
                .map_err(|source| GpuError::ReadFailed {
                    index,
                    field: "utilization rates",
                    source,
                })?;

        Ok(DeviceReading {
            index,
            name,
            uuid,
            temperature_celsius: temperature as f64,
            memory_total_mib: bytes_to_mib(memory.total),
            memory_used_mib: bytes_to_mib(memory.used),
            memory_free_mib: bytes_to_mib(memory.free),
            gpu_utilization_percent: utilization.gpu as f64,
            memory_utilization_percent: utilization.memory as f64,
        })
    }

    /// Enumerates all devices and reads each one.
    ///
    /// Devices that fail to read are logged and skipped; the returned vec
    /// only contains successful readings.
    pub fn read_all(&self) -> Result<Vec<DeviceReading>, GpuError> {
        let count = self.device_count()?;
        let mut readings = Vec::with_capacity(count as usize);

        for index in 0..count {
            match self.read_device(index) {
                Ok(reading) => readings.push(reading),
                Err(e) => {
                    warn!("Skipping GPU {}: {}", index, e);
                }
            }
        }

        Ok(readings)
    }

    /// Installed NVIDIA driver version string.
    pub fn driver_version(&self) -> Result<String, GpuError> {
        self.nvml
            .sys_driver_version()
            .map_err(|source| GpuError::Library {
                field: "driver version",
                source,
            })
    }

    /// NVML library version string.
    pub fn nvml_version(&self) -> Result<String, GpuError> {
        self.nvml
            .sys_nvml_version()
            .map_err(|source| GpuError::Library {
                field: "NVML version",
                source,
            })
    }
}

/// Converts a byte counter to whole MiB the way the exposition format
/// expects: truncating integer division, then widening to f64.
pub fn bytes_to_mib(bytes: u64) -> f64 {
    (bytes / BYTES_PER_MIB) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_to_mib_truncates() {
        assert_eq!(bytes_to_mib(0), 0.0);
        assert_eq!(bytes_to_mib(BYTES_PER_MIB), 1.0);
        assert_eq!(bytes_to_mib(BYTES_PER_MIB * 2 - 1), 1.0);
        // 8 GiB card
        assert_eq!(bytes_to_mib(8 * 1024 * BYTES_PER_MIB), 8192.0);
    }
}
