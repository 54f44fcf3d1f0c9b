//! NVIDIA GPU metric source backed by NVML.
//!
//! NVML is the library nvidia-smi itself uses. The device handle is resolved
//! on every query rather than cached, so a GPU reset or driver reload is
//! picked up on the next host refresh.

use crate::core::config::PluginConfig;
use crate::core::gpu::{GpuMetricSource, GpuSample};
use crate::core::metrics::GpuMetric;
use crate::error::{Result, SensorError};

#[cfg(feature = "nvml")]
use nvml_wrapper::enum_wrappers::device::{Clock, TemperatureSensor};
#[cfg(feature = "nvml")]
use nvml_wrapper::Nvml;

pub struct NvmlGpuSource {
    #[cfg(feature = "nvml")]
    nvml: Option<Nvml>,
    device_index: u32,
    limit_mask: u64,
}

impl NvmlGpuSource {
    pub fn new(device_index: u32, limit_mask: u64) -> Self {
        Self {
            #[cfg(feature = "nvml")]
            nvml: None,
            device_index,
            limit_mask,
        }
    }

    pub fn from_config(config: &PluginConfig) -> Self {
        Self::new(config.gpu_index, config.limit_throttle_mask)
    }
}

#[cfg(feature = "nvml")]
impl GpuMetricSource for NvmlGpuSource {
    fn initialize(&mut self) -> Result<()> {
        if self.nvml.is_some() {
            return Ok(());
        }

        let nvml = Nvml::init().map_err(|e| SensorError::backend(e.to_string()))?;
        self.nvml = Some(nvml);
        Ok(())
    }

    fn shutdown(&mut self) {
        if let Some(nvml) = self.nvml.take() {
            if let Err(e) = nvml.shutdown() {
                log::warn!("NVML shutdown failed: {}", e);
            }
        }
    }

    fn is_initialized(&self) -> bool {
        self.nvml.is_some()
    }

    fn sample(&self, metric: GpuMetric) -> Result<GpuSample> {
        let nvml = self.nvml.as_ref().ok_or(SensorError::NotInitialized)?;

        let device = nvml
            .device_by_index(self.device_index)
            .map_err(|e| SensorError::device_handle(e.to_string()))?;

        let sample = match metric {
            GpuMetric::Temp => device
                .temperature(TemperatureSensor::Gpu)
                .map(GpuSample::Temperature),
            GpuMetric::Limit => device
                .current_throttle_reasons()
                .map(|reasons| GpuSample::ThrottleReasons(reasons.bits())),
            GpuMetric::Fan => device.fan_speed(0).map(GpuSample::FanSpeed),
            GpuMetric::Power => device.power_usage().map(GpuSample::PowerUsage),
            GpuMetric::Clock => device.clock_info(Clock::Graphics).map(GpuSample::Clock),
            GpuMetric::MemClock => device.clock_info(Clock::Memory).map(GpuSample::Clock),
            GpuMetric::MemAlloc | GpuMetric::MemUsage => {
                device.memory_info().map(|memory| GpuSample::Memory {
                    used: memory.used,
                    total: memory.total,
                })
            }
            GpuMetric::Load => device
                .utilization_rates()
                .map(|utilization| GpuSample::Utilization(utilization.gpu)),
        };

        sample.map_err(|e| SensorError::backend(e.to_string()))
    }

    fn limit_mask(&self) -> u64 {
        self.limit_mask
    }
}

/// Fallback when the `nvml` feature is disabled: initialization always fails
#[cfg(not(feature = "nvml"))]
impl GpuMetricSource for NvmlGpuSource {
    fn initialize(&mut self) -> Result<()> {
        Err(SensorError::backend(format!(
            "NVML feature not enabled (device {}). Recompile with --features nvml",
            self.device_index
        )))
    }

    fn shutdown(&mut self) {}

    fn is_initialized(&self) -> bool {
        false
    }

    fn sample(&self, _metric: GpuMetric) -> Result<GpuSample> {
        Err(SensorError::NotInitialized)
    }

    fn limit_mask(&self) -> u64 {
        self.limit_mask
    }
}
