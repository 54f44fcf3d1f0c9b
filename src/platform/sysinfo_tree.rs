//! Hardware tree built from `sysinfo`, for platforms without LibreHardwareMonitor.
//!
//! Produces a single CPU node whose sensors carry the names the router looks
//! for. There are no fan sensors here, so fan queries report not found.

use sysinfo::{Components, System};

use crate::core::hardware_tree::{
    HardwareBackend, HardwareNode, HardwareType, Sensor, SensorType,
};
use crate::error::Result;

const CPU_NODE_ID: &str = "/sysinfo/cpu";

/// Component labels that identify the package temperature (Intel coretemp, AMD k10temp)
const PACKAGE_LABELS: [&str; 2] = ["Package", "Tctl"];

pub struct SysinfoBackend {
    system: System,
    components: Components,
}

impl Default for SysinfoBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoBackend {
    pub fn new() -> Self {
        Self {
            system: System::new(),
            components: Components::new(),
        }
    }

    fn cpu_sensors(&self) -> Vec<Sensor> {
        let mut sensors = vec![Sensor::new(
            SensorType::Load,
            "CPU Total",
            Some(self.system.global_cpu_usage()),
        )];

        sensors.extend(self.system.cpus().iter().enumerate().map(|(i, cpu)| {
            Sensor::new(
                SensorType::Clock,
                format!("CPU Core #{}", i + 1),
                Some(cpu.frequency() as f32),
            )
        }));

        if let Some(package) = self
            .components
            .iter()
            .find(|c| PACKAGE_LABELS.iter().any(|label| c.label().contains(label)))
        {
            sensors.push(Sensor::new(
                SensorType::Temperature,
                "CPU Package",
                package.temperature(),
            ));
        }

        sensors
    }
}

impl HardwareBackend for SysinfoBackend {
    fn open(&mut self) -> Result<Vec<HardwareNode>> {
        self.system.refresh_cpu_all();
        self.components = Components::new_with_refreshed_list();

        let brand = self
            .system
            .cpus()
            .first()
            .map(|cpu| cpu.brand().trim().to_string())
            .unwrap_or_else(|| "CPU".to_string());

        let mut node = HardwareNode::new(CPU_NODE_ID, brand, HardwareType::Cpu);
        node.sensors = self.cpu_sensors();
        Ok(vec![node])
    }

    fn update(&mut self, node: &mut HardwareNode) -> Result<()> {
        if node.identifier != CPU_NODE_ID {
            return Ok(());
        }

        self.system.refresh_cpu_all();
        self.components.refresh(true);
        node.sensors = self.cpu_sensors();
        Ok(())
    }
}
