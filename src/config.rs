use std::{fs, path::Path};

use serde::Deserialize;

use crate::Result;

/// Planner configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PlannerConfig {
    /// reuse historical run data of ancestors, defaults to true.
    /// when false only pinned data counts as available
    pub reuse_run_data: bool,
    /// schedule the target node even if it already has data, defaults to true
    pub schedule_target: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            reuse_run_data: true,
            schedule_target: true,
        }
    }
}

impl PlannerConfig {
    pub fn create<T: AsRef<Path>>(path: T) -> Result<Self> {
        let data = fs::read_to_string(path.as_ref())?;

        Self::load_from_str(data.as_str())
    }

    pub fn load_from_str(toml_str: &str) -> Result<Self> {
        let config = toml::from_str::<PlannerConfig>(toml_str)?;
        Ok(config)
    }
}
