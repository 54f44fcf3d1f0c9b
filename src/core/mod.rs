// Core query logic: metric registry, lookups, router and the plugin context

pub mod config;
pub mod cpu;
pub mod gpu;
pub mod hardware_tree;
pub mod metrics;
pub mod plugin;
pub mod router;

// Re-export commonly used items
pub use config::PluginConfig;
pub use cpu::{CpuMetricSource, HardwareMonitor};
pub use gpu::{GpuMetricSource, GpuSample};
pub use hardware_tree::{HardwareBackend, HardwareNode, HardwareType, Sensor, SensorType};
pub use metrics::{CpuMetric, Domain, GpuMetric, Reading};
pub use plugin::SensorPlugin;
