//! Plugin context: owns both metric sources for the lifetime of a host session.

use super::config::PluginConfig;
use super::cpu::{CpuMetricSource, HardwareMonitor};
use super::gpu::GpuMetricSource;
use super::hardware_tree::HardwareNode;
use super::metrics::Domain;
use super::router;
use crate::platform::{self, Notifier};

/// Everything one host session needs to answer queries
///
/// The host-integration layer constructs this at startup and drops it at
/// shutdown; every query goes through it.
pub struct SensorPlugin {
    config: PluginConfig,
    cpu: Box<dyn CpuMetricSource>,
    gpu: Box<dyn GpuMetricSource>,
    notifier: Box<dyn Notifier>,
    privilege_check: fn() -> bool,
}

impl SensorPlugin {
    pub fn new(
        config: PluginConfig,
        cpu: Box<dyn CpuMetricSource>,
        gpu: Box<dyn GpuMetricSource>,
    ) -> Self {
        Self {
            config,
            cpu,
            gpu,
            notifier: platform::default_notifier(),
            privilege_check: platform::is_elevated,
        }
    }

    /// Context wired to the platform's real backends
    pub fn with_platform_defaults(config: PluginConfig) -> Self {
        let cpu = HardwareMonitor::from_config(platform::default_hardware_backend(), &config);
        let gpu = platform::default_gpu_source(&config);
        Self::new(config, Box::new(cpu), gpu)
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_privilege_check(mut self, check: fn() -> bool) -> Self {
        self.privilege_check = check;
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Bring up both backends
    ///
    /// Nothing here is fatal: missing privileges, an NVML failure or a
    /// hardware tree that will not open are each reported once and the
    /// plugin carries on in a degraded state. Safe to call repeatedly; an
    /// open tree and an initialized GPU backend are left alone.
    pub fn initialize(&mut self) {
        if !(self.privilege_check)() {
            self.notify(
                "Error",
                "Administrative privileges required for this plugin",
            );
        }

        if !self.gpu.is_initialized() {
            match self.gpu.initialize() {
                Ok(()) => log::info!("NVML initialized"),
                Err(e) => self.notify("NVML Init Failed", &e.to_string()),
            }
        }

        if let Err(e) = self.cpu.open() {
            self.notify("Initialization Error", &e.to_string());
        }
    }

    /// Release the GPU backend and the hardware tree together
    ///
    /// Only acts when the GPU backend was initialized; returns whether
    /// anything was released.
    pub fn shutdown(&mut self) -> bool {
        if !self.gpu.is_initialized() {
            log::debug!("Shutdown skipped: GPU backend was never initialized");
            return false;
        }

        self.gpu.shutdown();
        self.cpu.close();
        log::info!("Sensor backends released");
        true
    }

    pub fn min_refresh_interval_ms(&self) -> u32 {
        self.config.min_refresh_interval_ms
    }

    pub fn query(&mut self, domain: Domain, name: &str, show_units: bool) -> String {
        router::query_metric(domain, self.cpu.as_mut(), self.gpu.as_ref(), name, show_units)
    }

    pub fn query_cpu(&mut self, name: &str, show_units: bool) -> String {
        self.query(Domain::Cpu, name, show_units)
    }

    pub fn query_gpu(&mut self, name: &str, show_units: bool) -> String {
        self.query(Domain::Gpu, name, show_units)
    }

    pub fn is_hardware_open(&self) -> bool {
        self.cpu.is_open()
    }

    pub fn is_gpu_initialized(&self) -> bool {
        self.gpu.is_initialized()
    }

    /// Freshly refreshed copy of the hardware tree; empty if it cannot be read
    pub fn hardware_snapshot(&mut self) -> Vec<HardwareNode> {
        self.cpu.snapshot().unwrap_or_else(|e| {
            log::warn!("Hardware tree snapshot failed: {}", e);
            Vec::new()
        })
    }

    fn notify(&self, title: &str, message: &str) {
        log::warn!("{}: {}", title, message);
        if self.config.show_notices {
            self.notifier.notify(title, message);
        }
    }
}
