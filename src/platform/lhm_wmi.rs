//! LibreHardwareMonitor hardware tree over WMI.
//!
//! LibreHardwareMonitor publishes its `Computer` tree as WMI instances:
//! `Hardware` (Identifier, Name, HardwareType, Parent) and `Sensor`
//! (Name, SensorType, Value, Index, Parent). LibreHardwareMonitor must be
//! running with its WMI provider for this backend to see anything; older
//! OpenHardwareMonitor builds publish the same classes under their own
//! namespace.

use once_cell::sync::OnceCell;
use serde::Deserialize;
use wmi::WMIConnection;

use crate::core::hardware_tree::{
    HardwareBackend, HardwareNode, HardwareType, Sensor, SensorType,
};
use crate::error::{Result, SensorError};

const NAMESPACES: [&str; 2] = ["root\\LibreHardwareMonitor", "root\\OpenHardwareMonitor"];

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct LhmHardware {
    identifier: String,
    name: Option<String>,
    hardware_type: Option<String>,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
struct LhmSensor {
    name: Option<String>,
    sensor_type: Option<String>,
    value: Option<f32>,
    #[serde(default)]
    index: Option<i32>,
}

/// Hardware backend reading LibreHardwareMonitor's WMI provider
///
/// `WMIConnection` is not `Send`, so only the namespace is cached and a
/// connection is opened per call.
pub struct LhmWmiBackend {
    namespace: OnceCell<&'static str>,
}

impl Default for LhmWmiBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl LhmWmiBackend {
    pub fn new() -> Self {
        Self {
            namespace: OnceCell::new(),
        }
    }

    fn connect(&self) -> Result<WMIConnection> {
        let namespace = resolve_namespace(&self.namespace, |ns| {
            WMIConnection::with_namespace_path(ns).is_ok()
        })?;

        WMIConnection::with_namespace_path(namespace)
            .map_err(|e| SensorError::wmi(format!("Failed to connect to {}: {}", namespace, e)))
    }
}

/// First namespace `reachable` accepts
///
/// Only a namespace that was found is remembered. While none is reachable
/// every call looks again, so a LibreHardwareMonitor started after the host
/// is picked up on the next query.
fn resolve_namespace(
    cell: &OnceCell<&'static str>,
    reachable: impl Fn(&str) -> bool,
) -> Result<&'static str> {
    cell.get_or_try_init(|| {
        NAMESPACES
            .iter()
            .copied()
            .find(|ns| reachable(*ns))
            .ok_or_else(|| {
                SensorError::wmi(
                    "LibreHardwareMonitor WMI namespace not available (is it running?)",
                )
            })
    })
    .copied()
}

/// Quote a value for a WQL string literal
fn wql_quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

/// Assemble the flat WMI hardware list into top-level nodes with their sub-hardware
///
/// Only CPU and motherboard groups are kept, the two groups the plugin
/// enables. Order follows the WMI result within each level.
fn build_tree(rows: Vec<LhmHardware>) -> Vec<HardwareNode> {
    let to_node = |row: &LhmHardware| {
        HardwareNode::new(
            row.identifier.clone(),
            row.name.clone().unwrap_or_default(),
            HardwareType::parse(row.hardware_type.as_deref().unwrap_or_default()),
        )
    };

    let is_top_level = |row: &LhmHardware| row.parent.as_deref().map_or(true, str::is_empty);

    let mut roots: Vec<HardwareNode> = rows
        .iter()
        .filter(|row| is_top_level(row))
        .map(to_node)
        .filter(|node| {
            matches!(
                node.hardware_type,
                HardwareType::Cpu | HardwareType::Motherboard
            )
        })
        .collect();

    for row in rows.iter().filter(|row| !is_top_level(row)) {
        let parent = row.parent.as_deref().unwrap_or_default();
        if let Some(root) = roots.iter_mut().find(|root| root.identifier == parent) {
            root.sub_hardware.push(to_node(row));
        }
    }

    roots
}

fn to_sensors(mut rows: Vec<LhmSensor>) -> Vec<Sensor> {
    rows.sort_by_key(|row| row.index.unwrap_or(i32::MAX));
    rows.into_iter()
        .map(|row| {
            Sensor::new(
                SensorType::parse(row.sensor_type.as_deref().unwrap_or_default()),
                row.name.unwrap_or_default(),
                row.value,
            )
        })
        .collect()
}

impl HardwareBackend for LhmWmiBackend {
    fn open(&mut self) -> Result<Vec<HardwareNode>> {
        let connection = self.connect()?;
        let rows: Vec<LhmHardware> = connection
            .raw_query("SELECT Identifier, Name, HardwareType, Parent FROM Hardware")
            .map_err(|e| SensorError::wmi(format!("Hardware query failed: {}", e)))?;

        log::debug!("LibreHardwareMonitor reported {} hardware entries", rows.len());
        Ok(build_tree(rows))
    }

    fn update(&mut self, node: &mut HardwareNode) -> Result<()> {
        let connection = self.connect()?;
        let query = format!(
            "SELECT Name, SensorType, Value, Index FROM Sensor WHERE Parent = {}",
            wql_quote(&node.identifier)
        );
        let rows: Vec<LhmSensor> = connection
            .raw_query(&query)
            .map_err(|e| SensorError::wmi(format!("Sensor query failed: {}", e)))?;

        node.sensors = to_sensors(rows);
        Ok(())
    }
}
