//! Sensor query router: name → lookup → display string.

use super::cpu::CpuMetricSource;
use super::gpu::GpuMetricSource;
use super::metrics::{CpuMetric, Domain, GpuMetric, Reading};
use crate::error::SensorError;

/// Longest string the host buffer accepts, excluding the terminator
pub const MAX_RESULT_CHARS: usize = 255;

pub const INVALID_PARAMETER: &str = "Invalid parameter";

/// Interpret the host's show-units argument; only `"1"` turns units on
pub fn parse_show_units(flag: &str) -> bool {
    flag == "1"
}

/// Format a successful reading, appending `unit` when asked
pub fn format_reading(reading: Reading, unit: &str, show_units: bool) -> String {
    let unit = if show_units { unit } else { "" };
    match reading {
        Reading::Integer(value) => format!("{}{}", value, unit),
        // Single-precision division keeps the rounding earlier releases displayed
        Reading::ClockMhz(mhz) => format!("{:.2}{}", f64::from(mhz as f32 / 1000.0), unit),
        Reading::Gibibytes(gib) => format!("{:.1}{}", gib, unit),
        Reading::Flag(true) => "!".to_string(),
        Reading::Flag(false) => " ".to_string(),
    }
}

/// Cap a result at [`MAX_RESULT_CHARS`] characters
pub fn truncate_result(mut text: String) -> String {
    if let Some((cut, _)) = text.char_indices().nth(MAX_RESULT_CHARS) {
        text.truncate(cut);
    }
    text
}

/// Answer a CPU query
pub fn query_cpu(source: &mut dyn CpuMetricSource, name: &str, show_units: bool) -> String {
    let Some(metric) = CpuMetric::from_name(name) else {
        return INVALID_PARAMETER.to_string();
    };

    let text = match source.lookup(metric) {
        // Negative values collide with the host's historical -1 sentinel
        Ok(Reading::Integer(value)) if value < 0 => metric.error_message().to_string(),
        Ok(reading) => format_reading(reading, metric.unit(), show_units),
        Err(e) => {
            log::debug!("CPU {} lookup failed: {}", metric.name(), e);
            metric.error_message().to_string()
        }
    };
    truncate_result(text)
}

/// Answer a GPU query
pub fn query_gpu(source: &dyn GpuMetricSource, name: &str, show_units: bool) -> String {
    if !source.is_initialized() {
        return SensorError::NotInitialized.to_string();
    }

    let Some(metric) = GpuMetric::from_name(name) else {
        return INVALID_PARAMETER.to_string();
    };

    let text = match source.lookup(metric) {
        Ok(reading) => format_reading(reading, metric.unit(), show_units),
        Err(e) => {
            log::debug!("GPU {} lookup failed: {}", metric.name(), e);
            gpu_error_text(metric, &e)
        }
    };
    truncate_result(text)
}

/// Host-facing text for a failed GPU lookup
fn gpu_error_text(metric: GpuMetric, error: &SensorError) -> String {
    match error {
        SensorError::NotInitialized | SensorError::DeviceHandle(_) => error.to_string(),
        SensorError::Backend(status) => format!("{}: {}", metric.failure_context(), status),
        other => format!("{}: {}", metric.failure_context(), other),
    }
}

/// Dispatch a query to the source for `domain`
pub fn query_metric(
    domain: Domain,
    cpu: &mut dyn CpuMetricSource,
    gpu: &dyn GpuMetricSource,
    name: &str,
    show_units: bool,
) -> String {
    match domain {
        Domain::Cpu => query_cpu(cpu, name, show_units),
        Domain::Gpu => query_gpu(gpu, name, show_units),
    }
}
