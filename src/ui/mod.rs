// Text rendering for the probe CLI

pub mod formatters;

pub use formatters::{format_sensor, format_tree};
