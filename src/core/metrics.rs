//! Metric registry: the fixed set of names the host may ask for, per domain.
//!
//! Names are matched exactly and case-sensitively; the host passes them
//! straight from the LCD Smartie screen definition (`$dll(plugin,1,Load,1)`).

use std::fmt;

/// Which exported query function a request came through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Cpu,
    Gpu,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Cpu => write!(f, "CPU"),
            Domain::Gpu => write!(f, "GPU"),
        }
    }
}

/// CPU-side metrics served from the hardware tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuMetric {
    Load,
    Power,
    Temp,
    FanRpm,
    Fan,
    Clock,
}

impl CpuMetric {
    pub const ALL: [CpuMetric; 6] = [
        CpuMetric::Load,
        CpuMetric::Power,
        CpuMetric::Temp,
        CpuMetric::FanRpm,
        CpuMetric::Fan,
        CpuMetric::Clock,
    ];

    /// Name as it appears in the host's query string
    pub fn name(self) -> &'static str {
        match self {
            CpuMetric::Load => "Load",
            CpuMetric::Power => "Power",
            CpuMetric::Temp => "Temp",
            CpuMetric::FanRpm => "Fan_RPM",
            CpuMetric::Fan => "Fan",
            CpuMetric::Clock => "Clock",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Unit suffix appended when the host asks for units
    pub fn unit(self) -> &'static str {
        match self {
            CpuMetric::Load | CpuMetric::Fan => "%",
            CpuMetric::Power => "W",
            CpuMetric::Temp => "°C",
            CpuMetric::FanRpm => "RPM",
            CpuMetric::Clock => "GHz",
        }
    }

    /// Display text used when the sensor cannot be found
    pub fn error_message(self) -> &'static str {
        match self {
            CpuMetric::Load => "Error reading CPU Load",
            CpuMetric::Power => "Error reading CPU Power",
            CpuMetric::Temp => "Error reading CPU Temp",
            CpuMetric::FanRpm | CpuMetric::Fan => "Error reading Fan Speed",
            CpuMetric::Clock => "Error reading CPU clock",
        }
    }
}

/// GPU-side metrics served from NVML
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GpuMetric {
    Load,
    Power,
    Limit,
    Temp,
    Fan,
    Clock,
    MemClock,
    MemAlloc,
    MemUsage,
}

impl GpuMetric {
    pub const ALL: [GpuMetric; 9] = [
        GpuMetric::Load,
        GpuMetric::Power,
        GpuMetric::Limit,
        GpuMetric::Temp,
        GpuMetric::Fan,
        GpuMetric::Clock,
        GpuMetric::MemClock,
        GpuMetric::MemAlloc,
        GpuMetric::MemUsage,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GpuMetric::Load => "Load",
            GpuMetric::Power => "Power",
            GpuMetric::Limit => "Limit",
            GpuMetric::Temp => "Temp",
            GpuMetric::Fan => "Fan",
            GpuMetric::Clock => "Clock",
            GpuMetric::MemClock => "Mem_Clock",
            GpuMetric::MemAlloc => "Mem_Alloc",
            GpuMetric::MemUsage => "Mem_Usage",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// Unit suffix; `Limit` is a fixed-width flag and never carries one
    pub fn unit(self) -> &'static str {
        match self {
            GpuMetric::Load | GpuMetric::Fan | GpuMetric::MemUsage => "%",
            GpuMetric::Power => "W",
            GpuMetric::Temp => "°C",
            GpuMetric::Clock | GpuMetric::MemClock => "GHz",
            GpuMetric::MemAlloc => "Gb",
            GpuMetric::Limit => "",
        }
    }

    /// Prefix placed before the vendor status text when a query fails
    pub fn failure_context(self) -> &'static str {
        match self {
            GpuMetric::Temp => "Error getting temp",
            GpuMetric::Limit => "Error getting throttle reasons",
            GpuMetric::Fan => "Error getting fan speed",
            GpuMetric::Power => "Error getting power usage",
            GpuMetric::Clock => "Error getting GPU clock",
            GpuMetric::MemClock => "Error getting Memory clock",
            GpuMetric::MemAlloc | GpuMetric::MemUsage => "Error getting memory usage",
            GpuMetric::Load => "Error getting GPU load",
        }
    }
}

/// A converted reading, ready for display formatting
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    /// Whole number shown as a plain decimal
    Integer(i64),
    /// Clock frequency in MHz, shown in GHz with two decimals
    ClockMhz(f64),
    /// Memory amount in GiB, shown with one decimal
    Gibibytes(f64),
    /// Throttle flag, shown as `!` or a single space
    Flag(bool),
}
