use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SensorError;

/// Index of the CPU fan among Fan sensors on the motherboard sensor bus.
/// #2 on a Nuvoton NCT6796D-R; other boards differ.
pub const DEFAULT_CPU_FAN_INDEX: usize = 2;
/// CPU cooler maximum speed, the RPM that maps to 100%
pub const DEFAULT_CPU_FAN_MAX_RPM: u32 = 1800;
/// Minimum refresh interval advertised to the host, in milliseconds
pub const DEFAULT_MIN_REFRESH_INTERVAL_MS: u32 = 300;
/// NVML throttle-reason bit that turns the `Limit` flag on
pub const DEFAULT_LIMIT_THROTTLE_MASK: u64 = 0x0000_0000_0000_0004;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    pub cpu_fan_index: usize,
    pub cpu_fan_max_rpm: u32,
    pub min_refresh_interval_ms: u32,
    pub gpu_index: u32,
    pub limit_throttle_mask: u64,
    /// Show blocking message boxes for startup problems
    pub show_notices: bool,
    pub log_level: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            cpu_fan_index: DEFAULT_CPU_FAN_INDEX,
            cpu_fan_max_rpm: DEFAULT_CPU_FAN_MAX_RPM,
            min_refresh_interval_ms: DEFAULT_MIN_REFRESH_INTERVAL_MS,
            gpu_index: 0,
            limit_throttle_mask: DEFAULT_LIMIT_THROTTLE_MASK,
            show_notices: true,
            log_level: "info".to_string(),
        }
    }
}

impl PluginConfig {
    /// Load from the user config directory, falling back to defaults
    ///
    /// A missing file is not an error. A file that cannot be parsed or fails
    /// validation is logged and replaced by the defaults so the plugin still
    /// comes up.
    pub fn load() -> Self {
        let path = match Self::get_config_path() {
            Ok(path) => path,
            Err(e) => {
                log::warn!("{:#}; using default configuration", e);
                return Self::default();
            }
        };

        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{:#}; using default configuration", e);
                Self::default()
            }
        }
    }

    /// Load from an explicit path; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: PluginConfig = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn validate(&self) -> std::result::Result<(), SensorError> {
        if self.cpu_fan_max_rpm == 0 {
            return Err(SensorError::config("cpu_fan_max_rpm must be greater than zero"));
        }
        if self.min_refresh_interval_ms == 0 {
            return Err(SensorError::config(
                "min_refresh_interval_ms must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Level for `env_logger`; unknown names fall back to `Info`
    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("smartie-hwmon").join("config.json"))
    }
}
