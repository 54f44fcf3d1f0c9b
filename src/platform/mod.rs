// Platform-specific backends: hardware tree sources, NVML, privileges, notices

pub mod elevation;
#[cfg(windows)]
pub mod lhm_wmi;
pub mod notice;
pub mod nvidia_nvml;
pub mod replay;
pub mod sysinfo_tree;

pub use elevation::is_elevated;
pub use notice::{default_notifier, LogNotifier, Notifier};
pub use nvidia_nvml::NvmlGpuSource;
pub use replay::ReplayBackend;
pub use sysinfo_tree::SysinfoBackend;

use crate::core::config::PluginConfig;
use crate::core::gpu::GpuMetricSource;
use crate::core::hardware_tree::HardwareBackend;

/// Hardware tree backend for this platform
///
/// Windows reads LibreHardwareMonitor over WMI; everything else falls back
/// to `sysinfo`.
pub fn default_hardware_backend() -> Box<dyn HardwareBackend> {
    #[cfg(windows)]
    {
        Box::new(lhm_wmi::LhmWmiBackend::new())
    }
    #[cfg(not(windows))]
    {
        Box::new(SysinfoBackend::new())
    }
}

pub fn default_gpu_source(config: &PluginConfig) -> Box<dyn GpuMetricSource> {
    Box::new(NvmlGpuSource::from_config(config))
}
