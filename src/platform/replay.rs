//! Hardware backend over a captured tree.
//!
//! Lets the probe CLI (and tests) answer CPU queries from a JSON dump of a
//! real machine's tree, e.g. one produced by `smartie-probe tree --json`.

use std::fs;
use std::path::Path;

use crate::core::hardware_tree::{HardwareBackend, HardwareNode};
use crate::error::{Result, SensorError};

#[derive(Debug, Clone, Default)]
pub struct ReplayBackend {
    tree: Vec<HardwareNode>,
    opens: usize,
    updates: usize,
}

impl ReplayBackend {
    pub fn new(tree: Vec<HardwareNode>) -> Self {
        Self {
            tree,
            opens: 0,
            updates: 0,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let tree: Vec<HardwareNode> = serde_json::from_str(json)
            .map_err(|e| SensorError::config(format!("Invalid hardware tree: {}", e)))?;
        Ok(Self::new(tree))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Number of times the tree has been opened
    pub fn open_count(&self) -> usize {
        self.opens
    }

    /// Number of node refreshes performed
    pub fn update_count(&self) -> usize {
        self.updates
    }
}

impl HardwareBackend for ReplayBackend {
    fn open(&mut self) -> Result<Vec<HardwareNode>> {
        self.opens += 1;
        Ok(self.tree.clone())
    }

    // Values are frozen; a refresh only counts
    fn update(&mut self, _node: &mut HardwareNode) -> Result<()> {
        self.updates += 1;
        Ok(())
    }
}
