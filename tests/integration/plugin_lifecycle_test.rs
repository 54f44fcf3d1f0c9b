use std::sync::atomic::Ordering;

use smartie_hwmon::core::cpu::HardwareMonitor;
use smartie_hwmon::core::metrics::Domain;
use smartie_hwmon::{PluginConfig, SensorPlugin};

use super::support::{desktop_tree, healthy_gpu, MockGpu, RecordingNotifier, SharedCountBackend};

fn quiet_config() -> PluginConfig {
    PluginConfig {
        show_notices: false,
        ..Default::default()
    }
}

#[test]
fn test_initialize_twice_opens_tree_once() {
    let (backend, opens) = SharedCountBackend::new(desktop_tree(900.0));
    let cpu = HardwareMonitor::new(backend, 2, 1800);
    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(cpu),
        Box::new(MockGpu::new(healthy_gpu)),
    )
    .with_privilege_check(|| true);

    plugin.initialize();
    plugin.initialize();

    assert_eq!(opens.load(Ordering::SeqCst), 1);
    assert!(plugin.is_hardware_open());
    assert!(plugin.is_gpu_initialized());
}

#[test]
fn test_queries_route_by_domain() {
    let (backend, _) = SharedCountBackend::new(desktop_tree(900.0));
    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(HardwareMonitor::new(backend, 2, 1800)),
        Box::new(MockGpu::new(healthy_gpu)),
    )
    .with_privilege_check(|| true);
    plugin.initialize();

    // Same name, different domain
    assert_eq!(plugin.query(Domain::Cpu, "Temp", true), "58°C");
    assert_eq!(plugin.query(Domain::Gpu, "Temp", true), "65°C");
    assert_eq!(plugin.query_cpu("Mem_Usage", false), "Invalid parameter");
    assert_eq!(plugin.query_gpu("Mem_Usage", false), "25");
}

#[test]
fn test_startup_problems_are_noticed_and_survived() {
    let notifier = RecordingNotifier::default();
    let mut gpu = MockGpu::new(healthy_gpu);
    gpu.init_error = Some("Driver Not Loaded");

    let mut plugin = SensorPlugin::new(
        PluginConfig::default(),
        Box::new(HardwareMonitor::new(SharedCountBackend::failing(), 2, 1800)),
        Box::new(gpu),
    )
    .with_notifier(Box::new(notifier.clone()))
    .with_privilege_check(|| false);

    plugin.initialize();

    let notices = notifier.notices.lock().clone();
    let titles: Vec<&str> = notices.iter().map(|(title, _)| title.as_str()).collect();
    assert_eq!(titles, vec!["Error", "NVML Init Failed", "Initialization Error"]);
    assert_eq!(notices[0].1, "Administrative privileges required for this plugin");
    assert_eq!(notices[1].1, "Driver Not Loaded");

    // Degraded, not dead
    assert_eq!(plugin.query_gpu("Load", false), "NVML not initialized");
    assert_eq!(plugin.query_cpu("Load", false), "Error reading CPU Load");
}

#[test]
fn test_notices_suppressed_by_config() {
    let notifier = RecordingNotifier::default();
    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(HardwareMonitor::new(SharedCountBackend::failing(), 2, 1800)),
        Box::new(MockGpu::new(healthy_gpu)),
    )
    .with_notifier(Box::new(notifier.clone()))
    .with_privilege_check(|| false);

    plugin.initialize();
    assert!(notifier.notices.lock().is_empty());
}

#[test]
fn test_shutdown_releases_both_backends() {
    let (backend, _) = SharedCountBackend::new(desktop_tree(900.0));
    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(HardwareMonitor::new(backend, 2, 1800)),
        Box::new(MockGpu::new(healthy_gpu)),
    )
    .with_privilege_check(|| true);
    plugin.initialize();

    assert!(plugin.shutdown());
    assert!(!plugin.is_hardware_open());
    assert!(!plugin.is_gpu_initialized());
    assert_eq!(plugin.query_gpu("Temp", false), "NVML not initialized");
}

#[test]
fn test_shutdown_is_skipped_without_gpu() {
    let (backend, _) = SharedCountBackend::new(desktop_tree(900.0));
    let mut gpu = MockGpu::new(healthy_gpu);
    gpu.init_error = Some("NVML Shared Library Not Found");

    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(HardwareMonitor::new(backend, 2, 1800)),
        Box::new(gpu),
    )
    .with_privilege_check(|| true);
    plugin.initialize();

    assert!(!plugin.shutdown());
    assert!(plugin.is_hardware_open());
}

#[test]
fn test_refresh_interval_comes_from_config() {
    let config = PluginConfig {
        min_refresh_interval_ms: 1000,
        ..quiet_config()
    };
    let plugin = SensorPlugin::new(
        config,
        Box::new(HardwareMonitor::new(SharedCountBackend::failing(), 2, 1800)),
        Box::new(MockGpu::new(healthy_gpu)),
    );

    assert_eq!(plugin.min_refresh_interval_ms(), 1000);
    assert_eq!(plugin.config().cpu_fan_max_rpm, 1800);
}

#[test]
fn test_snapshot_of_unopenable_tree_is_empty() {
    let mut plugin = SensorPlugin::new(
        quiet_config(),
        Box::new(HardwareMonitor::new(SharedCountBackend::failing(), 2, 1800)),
        Box::new(MockGpu::new(healthy_gpu)),
    );

    assert!(plugin.hardware_snapshot().is_empty());
}
