use smartie_hwmon::core::cpu::{CpuMetricSource, HardwareMonitor};
use smartie_hwmon::core::hardware_tree::{HardwareNode, HardwareType, Sensor, SensorType};
use smartie_hwmon::core::router::{query_cpu, INVALID_PARAMETER};
use smartie_hwmon::platform::ReplayBackend;

use super::support::{desktop_tree, SharedCountBackend};

fn monitor(tree: Vec<HardwareNode>) -> HardwareMonitor<ReplayBackend> {
    HardwareMonitor::new(ReplayBackend::new(tree), 2, 1800)
}

#[test]
fn test_cpu_values_without_units() {
    let mut cpu = monitor(desktop_tree(900.0));

    assert_eq!(query_cpu(&mut cpu, "Load", false), "23");
    assert_eq!(query_cpu(&mut cpu, "Power", false), "47");
    assert_eq!(query_cpu(&mut cpu, "Temp", false), "58");
    assert_eq!(query_cpu(&mut cpu, "Fan_RPM", false), "900");
    assert_eq!(query_cpu(&mut cpu, "Fan", false), "50");
    assert_eq!(query_cpu(&mut cpu, "Clock", false), "3.70");
}

#[test]
fn test_cpu_values_with_units() {
    let mut cpu = monitor(desktop_tree(900.0));

    assert_eq!(query_cpu(&mut cpu, "Load", true), "23%");
    assert_eq!(query_cpu(&mut cpu, "Power", true), "47W");
    assert_eq!(query_cpu(&mut cpu, "Temp", true), "58°C");
    assert_eq!(query_cpu(&mut cpu, "Fan_RPM", true), "900RPM");
    assert_eq!(query_cpu(&mut cpu, "Fan", true), "50%");
    assert_eq!(query_cpu(&mut cpu, "Clock", true), "3.70GHz");
}

#[test]
fn test_fan_percent_extremes() {
    let mut stopped = monitor(desktop_tree(0.0));
    assert_eq!(query_cpu(&mut stopped, "Fan_RPM", false), "0");
    assert_eq!(query_cpu(&mut stopped, "Fan", true), "0%");

    let mut flat_out = monitor(desktop_tree(1800.0));
    assert_eq!(query_cpu(&mut flat_out, "Fan", true), "100%");
}

#[test]
fn test_unknown_names_are_invalid() {
    let mut cpu = monitor(desktop_tree(900.0));

    assert_eq!(query_cpu(&mut cpu, "load", false), INVALID_PARAMETER);
    assert_eq!(query_cpu(&mut cpu, "Fan_Rpm", false), INVALID_PARAMETER);
    assert_eq!(query_cpu(&mut cpu, "", true), INVALID_PARAMETER);
}

#[test]
fn test_missing_sensors_report_fixed_errors() {
    let tree = vec![HardwareNode::new("/amdcpu/0", "AMD Ryzen 7 5800X", HardwareType::Cpu)
        .with_sensor(Sensor::new(SensorType::Load, "CPU Total", Some(5.0)))];
    let mut cpu = monitor(tree);

    assert_eq!(query_cpu(&mut cpu, "Load", true), "5%");
    assert_eq!(query_cpu(&mut cpu, "Temp", true), "Error reading CPU Temp");
    assert_eq!(query_cpu(&mut cpu, "Power", false), "Error reading CPU Power");
    assert_eq!(query_cpu(&mut cpu, "Clock", true), "Error reading CPU clock");
    assert_eq!(query_cpu(&mut cpu, "Fan", true), "Error reading Fan Speed");
    assert_eq!(query_cpu(&mut cpu, "Fan_RPM", false), "Error reading Fan Speed");
}

#[test]
fn test_negative_reading_is_an_error() {
    let tree = vec![HardwareNode::new("/intelcpu/0", "CPU", HardwareType::Cpu)
        .with_sensor(Sensor::new(SensorType::Temperature, "CPU Package", Some(-3.0)))];
    let mut cpu = monitor(tree);

    assert_eq!(query_cpu(&mut cpu, "Temp", true), "Error reading CPU Temp");
}

#[test]
fn test_unopenable_tree_reports_fixed_errors() {
    let mut cpu = HardwareMonitor::new(SharedCountBackend::failing(), 2, 1800);

    assert_eq!(query_cpu(&mut cpu, "Load", false), "Error reading CPU Load");
    assert!(!cpu.is_open());
}

#[test]
fn test_tree_opens_lazily_and_once() {
    let (backend, opens) = SharedCountBackend::new(desktop_tree(900.0));
    let mut cpu = HardwareMonitor::new(backend, 2, 1800);
    assert!(!cpu.is_open());

    query_cpu(&mut cpu, "Load", false);
    query_cpu(&mut cpu, "Fan", false);
    assert!(cpu.is_open());
    assert_eq!(opens.load(std::sync::atomic::Ordering::SeqCst), 1);
}

#[test]
fn test_replayed_json_tree() {
    let json = r#"[
        {
            "identifier": "/intelcpu/0",
            "name": "Intel Core i5-12600K",
            "hardware_type": "Cpu",
            "sensors": [
                { "sensor_type": "Clock", "name": "CPU Core #1", "value": 4500.0 },
                { "sensor_type": "Load", "name": "CPU Total", "value": 99.9 }
            ]
        }
    ]"#;
    let mut cpu = HardwareMonitor::new(ReplayBackend::from_json(json).unwrap(), 2, 1800);

    assert_eq!(query_cpu(&mut cpu, "Clock", true), "4.50GHz");
    assert_eq!(query_cpu(&mut cpu, "Load", false), "99");
    assert_eq!(cpu.backend().open_count(), 1);
    assert_eq!(cpu.backend().update_count(), 2);
}

#[test]
fn test_snapshot_returns_whole_tree() {
    let mut cpu = monitor(desktop_tree(900.0));
    let nodes = cpu.snapshot().unwrap();

    assert_eq!(nodes.len(), 2);
    assert_eq!(nodes[0].sub_hardware[0].sensor_count(), 4);
}
