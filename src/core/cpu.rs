//! CPU sensor lookup over a hardware tree.

use super::config::PluginConfig;
use super::hardware_tree::{HardwareBackend, HardwareNode, HardwareType, SensorType};
use super::metrics::{CpuMetric, Reading};
use crate::error::{Result, SensorError};

/// Capability interface for CPU-side metrics
///
/// Implementations own whatever handle the backend needs. `open` must be
/// idempotent: a second call while open is a no-op.
pub trait CpuMetricSource: Send {
    fn open(&mut self) -> Result<()>;

    fn close(&mut self);

    fn is_open(&self) -> bool;

    /// Refresh and read one metric
    fn lookup(&mut self, metric: CpuMetric) -> Result<Reading>;

    /// Refresh every node and return a copy of the tree, for diagnostics
    fn snapshot(&mut self) -> Result<Vec<HardwareNode>> {
        Ok(Vec::new())
    }
}

/// How a sensor name is matched
#[derive(Debug, Clone, Copy)]
enum NameMatch {
    Exact(&'static str),
    Contains(&'static str),
}

impl NameMatch {
    fn matches(self, name: &str) -> bool {
        match self {
            NameMatch::Exact(expected) => name == expected,
            NameMatch::Contains(fragment) => name.contains(fragment),
        }
    }
}

/// Sensor selector for the CPU-scoped metrics
fn cpu_sensor_selector(metric: CpuMetric) -> Option<(SensorType, NameMatch)> {
    match metric {
        CpuMetric::Load => Some((SensorType::Load, NameMatch::Exact("CPU Total"))),
        CpuMetric::Power => Some((SensorType::Power, NameMatch::Contains("Package"))),
        CpuMetric::Temp => Some((SensorType::Temperature, NameMatch::Exact("CPU Package"))),
        CpuMetric::Clock => Some((SensorType::Clock, NameMatch::Exact("CPU Core #1"))),
        CpuMetric::Fan | CpuMetric::FanRpm => None,
    }
}

/// Convert a fan reading to a percentage of `max_rpm`, truncating
///
/// A stopped fan reads 0 regardless of the reference speed.
pub fn fan_percent(rpm: f32, max_rpm: u32) -> i64 {
    if rpm == 0.0 || max_rpm == 0 {
        return 0;
    }
    ((rpm / max_rpm as f32) * 100.0) as i64
}

/// CPU metric source backed by a hardware tree
///
/// Every lookup refreshes the nodes it touches; nothing is cached between
/// calls. The host already rate-limits polling through
/// `GetMinRefreshInterval`.
pub struct HardwareMonitor<B> {
    backend: B,
    hardware: Option<Vec<HardwareNode>>,
    fan_index: usize,
    fan_max_rpm: u32,
}

impl<B: HardwareBackend> HardwareMonitor<B> {
    pub fn new(backend: B, fan_index: usize, fan_max_rpm: u32) -> Self {
        Self {
            backend,
            hardware: None,
            fan_index,
            fan_max_rpm,
        }
    }

    pub fn from_config(backend: B, config: &PluginConfig) -> Self {
        Self::new(backend, config.cpu_fan_index, config.cpu_fan_max_rpm)
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// First matching sensor on a CPU node, refreshing each CPU node before it is scanned
    fn read_cpu_sensor(&mut self, sensor_type: SensorType, name: NameMatch) -> Result<f32> {
        self.open()?;

        let Self {
            backend, hardware, ..
        } = self;
        let hardware = hardware
            .as_mut()
            .ok_or_else(|| SensorError::not_found("hardware tree"))?;

        for node in hardware
            .iter_mut()
            .filter(|node| node.hardware_type == HardwareType::Cpu)
        {
            backend.update(node)?;

            if let Some(sensor) = node
                .sensors
                .iter()
                .find(|s| s.sensor_type == sensor_type && name.matches(&s.name))
            {
                log::trace!("{}: {} = {:?}", node.identifier, sensor.name, sensor.value);
                return Ok(sensor.value_or_zero());
            }
        }

        Err(SensorError::not_found(format!("{:?} sensor {:?}", sensor_type, name)))
    }

    /// RPM of the configured fan
    ///
    /// Fans are identified only by position: Fan sensors on sub-hardware are
    /// counted in traversal order (top-level node order, then sub-hardware
    /// order, then sensor order). A different board layout or a backend that
    /// enumerates in another order will report a different physical fan.
    fn read_fan_rpm(&mut self) -> Result<f32> {
        self.open()?;

        let fan_index = self.fan_index;
        let Self {
            backend, hardware, ..
        } = self;
        let hardware = hardware
            .as_mut()
            .ok_or_else(|| SensorError::not_found("hardware tree"))?;

        let mut position = 0;
        for node in hardware.iter_mut() {
            backend.update(node)?;

            for sub in node.sub_hardware.iter_mut() {
                backend.update(sub)?;

                for sensor in sub
                    .sensors
                    .iter()
                    .filter(|s| s.sensor_type == SensorType::Fan)
                {
                    if position == fan_index {
                        log::trace!("{}: {} = {:?}", sub.identifier, sensor.name, sensor.value);
                        return Ok(sensor.value_or_zero());
                    }
                    position += 1;
                }
            }
        }

        Err(SensorError::not_found(format!(
            "fan #{} (only {} fan sensors present)",
            fan_index, position
        )))
    }
}

impl<B: HardwareBackend> CpuMetricSource for HardwareMonitor<B> {
    fn open(&mut self) -> Result<()> {
        if self.hardware.is_some() {
            return Ok(());
        }

        let hardware = self.backend.open()?;
        log::debug!("Hardware tree opened with {} top-level nodes", hardware.len());
        self.hardware = Some(hardware);
        Ok(())
    }

    fn close(&mut self) {
        if self.hardware.take().is_some() {
            self.backend.close();
            log::debug!("Hardware tree closed");
        }
    }

    fn is_open(&self) -> bool {
        self.hardware.is_some()
    }

    fn lookup(&mut self, metric: CpuMetric) -> Result<Reading> {
        if let Some((sensor_type, name)) = cpu_sensor_selector(metric) {
            let value = self.read_cpu_sensor(sensor_type, name)?;
            return Ok(match metric {
                CpuMetric::Clock => Reading::ClockMhz(f64::from(value)),
                _ => Reading::Integer(value as i64),
            });
        }

        let rpm = self.read_fan_rpm()?;
        Ok(match metric {
            CpuMetric::Fan => Reading::Integer(fan_percent(rpm, self.fan_max_rpm)),
            _ => Reading::Integer(rpm as i64),
        })
    }

    fn snapshot(&mut self) -> Result<Vec<HardwareNode>> {
        self.open()?;

        let Self {
            backend, hardware, ..
        } = self;
        let hardware = hardware
            .as_mut()
            .ok_or_else(|| SensorError::not_found("hardware tree"))?;

        for node in hardware.iter_mut() {
            backend.update(node)?;
            for sub in node.sub_hardware.iter_mut() {
                backend.update(sub)?;
            }
        }
        Ok(hardware.clone())
    }
}
