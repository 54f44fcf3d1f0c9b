//! GPU sensor lookup.
//!
//! Sources only report raw vendor values ([`GpuSample`]); converting them to
//! display units happens here so every source converts the same way.

use super::metrics::{GpuMetric, Reading};
use crate::error::{Result, SensorError};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Raw value returned by one vendor query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpuSample {
    /// Degrees Celsius
    Temperature(u32),
    /// Throttle-reason bitmask
    ThrottleReasons(u64),
    /// Fan speed, percent
    FanSpeed(u32),
    /// Board power draw, milliwatts
    PowerUsage(u32),
    /// Current clock, MHz
    Clock(u32),
    /// Memory info, bytes
    Memory { used: u64, total: u64 },
    /// GPU utilization, percent
    Utilization(u32),
}

/// Capability interface for GPU-side metrics
///
/// Every query resolves the device handle afresh. Queries made while the
/// backend is not initialized fail with [`SensorError::NotInitialized`].
pub trait GpuMetricSource: Send {
    fn initialize(&mut self) -> Result<()>;

    fn shutdown(&mut self);

    fn is_initialized(&self) -> bool;

    /// Perform the vendor query backing `metric`
    fn sample(&self, metric: GpuMetric) -> Result<GpuSample>;

    /// Bits of the throttle-reason mask that raise the `Limit` flag
    fn limit_mask(&self) -> u64 {
        crate::core::config::DEFAULT_LIMIT_THROTTLE_MASK
    }

    fn lookup(&self, metric: GpuMetric) -> Result<Reading> {
        let sample = self.sample(metric)?;
        convert_sample(metric, sample, self.limit_mask())
    }
}

/// Milliwatts to watts, rounding half up
pub fn milliwatts_to_watts(milliwatts: u32) -> i64 {
    (f64::from(milliwatts) / 1000.0 + 0.5) as i64
}

pub fn bytes_to_gib(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_GIB
}

/// Used memory as a truncated percentage of the total
pub fn memory_usage_percent(used: u64, total: u64) -> Option<i64> {
    (u128::from(used) * 100)
        .checked_div(u128::from(total))
        .map(|percent| percent as i64)
}

/// Turn a raw sample into a display reading for `metric`
pub fn convert_sample(metric: GpuMetric, sample: GpuSample, limit_mask: u64) -> Result<Reading> {
    let reading = match (metric, sample) {
        (GpuMetric::Temp, GpuSample::Temperature(celsius)) => Reading::Integer(i64::from(celsius)),
        (GpuMetric::Limit, GpuSample::ThrottleReasons(reasons)) => {
            Reading::Flag(reasons & limit_mask != 0)
        }
        (GpuMetric::Fan, GpuSample::FanSpeed(percent)) => Reading::Integer(i64::from(percent)),
        (GpuMetric::Power, GpuSample::PowerUsage(mw)) => Reading::Integer(milliwatts_to_watts(mw)),
        (GpuMetric::Clock | GpuMetric::MemClock, GpuSample::Clock(mhz)) => {
            Reading::ClockMhz(f64::from(mhz))
        }
        (GpuMetric::MemAlloc, GpuSample::Memory { used, .. }) => {
            Reading::Gibibytes(bytes_to_gib(used))
        }
        (GpuMetric::MemUsage, GpuSample::Memory { used, total }) => {
            let percent = memory_usage_percent(used, total)
                .ok_or_else(|| SensorError::backend("total memory reported as zero"))?;
            Reading::Integer(percent)
        }
        (GpuMetric::Load, GpuSample::Utilization(percent)) => Reading::Integer(i64::from(percent)),
        (metric, sample) => {
            return Err(SensorError::backend(format!(
                "unexpected sample {:?} for {}",
                sample,
                metric.name()
            )))
        }
    };
    Ok(reading)
}
