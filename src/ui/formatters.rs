use crate::core::hardware_tree::{HardwareNode, Sensor};

/// Render the hardware tree as indented text, one node or sensor per line
///
/// Fan sensors on sub-hardware are prefixed with their position in the fan
/// count, which is what `cpu_fan_index` refers to.
pub fn format_tree(nodes: &[HardwareNode]) -> String {
    let mut out = String::new();
    let mut fan_position = 0;

    for node in nodes {
        out.push_str(&format!(
            "{} [{:?}] {}\n",
            node.name, node.hardware_type, node.identifier
        ));
        for sensor in &node.sensors {
            out.push_str(&format!("    {}\n", format_sensor(sensor)));
        }

        for sub in &node.sub_hardware {
            out.push_str(&format!(
                "    {} [{:?}] {}\n",
                sub.name, sub.hardware_type, sub.identifier
            ));
            for sensor in &sub.sensors {
                let mut line = format_sensor(sensor);
                if sensor.sensor_type == crate::core::SensorType::Fan {
                    line.push_str(&format!("  (fan index {})", fan_position));
                    fan_position += 1;
                }
                out.push_str(&format!("        {}\n", line));
            }
        }
    }

    out
}

pub fn format_sensor(sensor: &Sensor) -> String {
    let kind = format!("{:?}", sensor.sensor_type);
    match sensor.value {
        Some(value) => format!("{:<12} {:<24} {:.1}", kind, sensor.name, value),
        None => format!("{:<12} {:<24} -", kind, sensor.name),
    }
}
