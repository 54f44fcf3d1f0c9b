// smartie-hwmon - LCD Smartie hardware telemetry plugin

// Re-export error types
pub mod error;
pub use error::{Result, SensorError};

// Module declarations
pub mod core;
pub mod ffi;
pub mod platform;
pub mod ui;

// Re-export commonly used types
pub use core::config::PluginConfig;
pub use core::plugin::SensorPlugin;

/// Initialize logging; `RUST_LOG` overrides the configured level
///
/// The host may load and initialize the plugin more than once per process,
/// so a logger that is already installed is left in place.
pub fn init_logging(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}
