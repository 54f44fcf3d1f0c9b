use std::io;
use thiserror::Error;

/// Error type for sensor lookups and backend plumbing
#[derive(Error, Debug)]
pub enum SensorError {
    /// The requested sensor does not exist in the current hardware tree
    #[error("Sensor not found: {0}")]
    NotFound(String),

    #[error("NVML not initialized")]
    NotInitialized,

    /// The GPU device handle could not be resolved
    #[error("GPU handle error: {0}")]
    DeviceHandle(String),

    /// A vendor call returned a non-success status; the payload is the vendor's own text
    #[error("{0}")]
    Backend(String),

    #[error("WMI error: {0}")]
    Wmi(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for sensor operations
pub type Result<T> = std::result::Result<T, SensorError>;

impl SensorError {
    /// Create a not-found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        SensorError::NotFound(what.into())
    }

    /// Create a device handle error
    pub fn device_handle<S: Into<String>>(msg: S) -> Self {
        SensorError::DeviceHandle(msg.into())
    }

    /// Create a backend error carrying the vendor status text
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        SensorError::Backend(msg.into())
    }

    pub fn wmi<S: Into<String>>(msg: S) -> Self {
        SensorError::Wmi(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        SensorError::Config(msg.into())
    }

    /// True for the "sensor does not exist" class of failures
    pub fn is_not_found(&self) -> bool {
        matches!(self, SensorError::NotFound(_))
    }
}
