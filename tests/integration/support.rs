// Shared fixtures for the integration tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use smartie_hwmon::core::gpu::{GpuMetricSource, GpuSample};
use smartie_hwmon::core::hardware_tree::{
    HardwareBackend, HardwareNode, HardwareType, Sensor, SensorType,
};
use smartie_hwmon::core::metrics::GpuMetric;
use smartie_hwmon::platform::Notifier;
use smartie_hwmon::{Result, SensorError};

/// Tree shaped like a desktop with a Nuvoton Super I/O chip under the board
pub fn desktop_tree(cpu_fan_rpm: f32) -> Vec<HardwareNode> {
    vec![
        HardwareNode::new("/mainboard", "ASUS PRIME Z390-A", HardwareType::Motherboard)
            .with_sub_hardware(
                HardwareNode::new("/lpc/nct6796d", "Nuvoton NCT6796D-R", HardwareType::SuperIo)
                    .with_sensor(Sensor::new(SensorType::Other, "Vcore", Some(1.2)))
                    .with_sensor(Sensor::new(SensorType::Fan, "Fan #1", Some(640.0)))
                    .with_sensor(Sensor::new(SensorType::Fan, "Fan #2", Some(0.0)))
                    .with_sensor(Sensor::new(SensorType::Fan, "Fan #3", Some(cpu_fan_rpm))),
            ),
        HardwareNode::new("/intelcpu/0", "Intel Core i7-9700K", HardwareType::Cpu)
            .with_sensor(Sensor::new(SensorType::Load, "CPU Core #1", Some(71.0)))
            .with_sensor(Sensor::new(SensorType::Load, "CPU Total", Some(23.9)))
            .with_sensor(Sensor::new(SensorType::Power, "CPU Package", Some(47.6)))
            .with_sensor(Sensor::new(SensorType::Temperature, "CPU Package", Some(58.0)))
            .with_sensor(Sensor::new(SensorType::Clock, "CPU Core #1", Some(3700.0))),
    ]
}

/// Backend over a fixed tree that shares its open count with the test
pub struct SharedCountBackend {
    pub tree: Vec<HardwareNode>,
    pub opens: Arc<AtomicUsize>,
    pub fail_open: bool,
}

impl SharedCountBackend {
    pub fn new(tree: Vec<HardwareNode>) -> (Self, Arc<AtomicUsize>) {
        let opens = Arc::new(AtomicUsize::new(0));
        let backend = Self {
            tree,
            opens: Arc::clone(&opens),
            fail_open: false,
        };
        (backend, opens)
    }

    pub fn failing() -> Self {
        Self {
            tree: Vec::new(),
            opens: Arc::new(AtomicUsize::new(0)),
            fail_open: true,
        }
    }
}

impl HardwareBackend for SharedCountBackend {
    fn open(&mut self) -> Result<Vec<HardwareNode>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.fail_open {
            return Err(SensorError::wmi("LibreHardwareMonitor namespace not found"));
        }
        Ok(self.tree.clone())
    }

    fn update(&mut self, _node: &mut HardwareNode) -> Result<()> {
        Ok(())
    }
}

/// GPU source answering from a lookup function
pub struct MockGpu {
    pub initialized: bool,
    pub init_error: Option<&'static str>,
    pub respond: fn(GpuMetric) -> Result<GpuSample>,
}

impl MockGpu {
    pub fn new(respond: fn(GpuMetric) -> Result<GpuSample>) -> Self {
        Self {
            initialized: false,
            init_error: None,
            respond,
        }
    }

    pub fn initialized(respond: fn(GpuMetric) -> Result<GpuSample>) -> Self {
        Self {
            initialized: true,
            ..Self::new(respond)
        }
    }
}

impl GpuMetricSource for MockGpu {
    fn initialize(&mut self) -> Result<()> {
        if let Some(status) = self.init_error {
            return Err(SensorError::backend(status));
        }
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn sample(&self, metric: GpuMetric) -> Result<GpuSample> {
        (self.respond)(metric)
    }
}

/// A healthy RTX-class card
pub fn healthy_gpu(metric: GpuMetric) -> Result<GpuSample> {
    Ok(match metric {
        GpuMetric::Load => GpuSample::Utilization(37),
        GpuMetric::Power => GpuSample::PowerUsage(123_456),
        GpuMetric::Limit => GpuSample::ThrottleReasons(0x4),
        GpuMetric::Temp => GpuSample::Temperature(65),
        GpuMetric::Fan => GpuSample::FanSpeed(44),
        GpuMetric::Clock => GpuSample::Clock(1500),
        GpuMetric::MemClock => GpuSample::Clock(7000),
        GpuMetric::MemAlloc | GpuMetric::MemUsage => GpuSample::Memory {
            used: 2_147_483_648,
            total: 8_589_934_592,
        },
    })
}

/// Records every notice it is asked to show
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub notices: Arc<Mutex<Vec<(String, String)>>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, title: &str, message: &str) {
        self.notices
            .lock()
            .push((title.to_string(), message.to_string()));
    }
}
