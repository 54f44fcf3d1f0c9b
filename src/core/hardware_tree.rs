//! Hardware tree model shared by every CPU-side backend.
//!
//! The shape mirrors what LibreHardwareMonitor exposes: top-level hardware
//! nodes (CPU, motherboard, ...) owning typed sensors, with optional
//! sub-hardware (e.g. the Super I/O chip under the motherboard) that carries
//! its own sensors. Backends populate the tree once on open and refresh
//! individual nodes on demand.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Hardware category of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HardwareType {
    Cpu,
    Motherboard,
    SuperIo,
    Gpu,
    Memory,
    Storage,
    Other,
}

impl HardwareType {
    /// Parse the type name LibreHardwareMonitor reports (`Cpu`, `SuperIO`, `GpuNvidia`, ...)
    pub fn parse(name: &str) -> Self {
        match name {
            "Cpu" | "CPU" => HardwareType::Cpu,
            "Motherboard" | "Mainboard" => HardwareType::Motherboard,
            "SuperIO" | "SuperIo" => HardwareType::SuperIo,
            "Memory" | "RAM" => HardwareType::Memory,
            "Storage" | "HDD" => HardwareType::Storage,
            n if n.starts_with("Gpu") || n.starts_with("GPU") => HardwareType::Gpu,
            _ => HardwareType::Other,
        }
    }
}

/// Sensor category; anything the plugin never reads collapses into `Other`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SensorType {
    Load,
    Power,
    Temperature,
    Fan,
    Clock,
    Other,
}

impl SensorType {
    pub fn parse(name: &str) -> Self {
        match name {
            "Load" => SensorType::Load,
            "Power" => SensorType::Power,
            "Temperature" => SensorType::Temperature,
            "Fan" => SensorType::Fan,
            "Clock" => SensorType::Clock,
            _ => SensorType::Other,
        }
    }
}

/// A named, typed measurement with an optional current value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sensor {
    pub sensor_type: SensorType,
    pub name: String,
    #[serde(default)]
    pub value: Option<f32>,
}

impl Sensor {
    pub fn new<S: Into<String>>(sensor_type: SensorType, name: S, value: Option<f32>) -> Self {
        Self {
            sensor_type,
            name: name.into(),
            value,
        }
    }

    /// Current value, with a missing reading treated as zero
    pub fn value_or_zero(&self) -> f32 {
        self.value.unwrap_or(0.0)
    }
}

/// A device grouping owning sensors and optional sub-hardware
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareNode {
    /// Backend-specific stable key (LHM identifier such as `/intelcpu/0`)
    pub identifier: String,
    pub name: String,
    pub hardware_type: HardwareType,
    #[serde(default)]
    pub sensors: Vec<Sensor>,
    #[serde(default)]
    pub sub_hardware: Vec<HardwareNode>,
}

impl HardwareNode {
    pub fn new<I: Into<String>, N: Into<String>>(
        identifier: I,
        name: N,
        hardware_type: HardwareType,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            hardware_type,
            sensors: Vec::new(),
            sub_hardware: Vec::new(),
        }
    }

    pub fn with_sensor(mut self, sensor: Sensor) -> Self {
        self.sensors.push(sensor);
        self
    }

    pub fn with_sub_hardware(mut self, node: HardwareNode) -> Self {
        self.sub_hardware.push(node);
        self
    }

    /// Total number of sensors in this node and its sub-hardware
    pub fn sensor_count(&self) -> usize {
        self.sensors.len()
            + self
                .sub_hardware
                .iter()
                .map(HardwareNode::sensor_count)
                .sum::<usize>()
    }
}

/// Source of a hardware tree
///
/// `open` enumerates the top-level nodes (with their sub-hardware attached).
/// `update` recomputes the sensor values of exactly one node; sub-hardware
/// is refreshed by separate calls.
pub trait HardwareBackend: Send {
    fn open(&mut self) -> Result<Vec<HardwareNode>>;

    fn update(&mut self, node: &mut HardwareNode) -> Result<()>;

    fn close(&mut self) {}
}

impl<B: HardwareBackend + ?Sized> HardwareBackend for Box<B> {
    fn open(&mut self) -> Result<Vec<HardwareNode>> {
        (**self).open()
    }

    fn update(&mut self, node: &mut HardwareNode) -> Result<()> {
        (**self).update(node)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
