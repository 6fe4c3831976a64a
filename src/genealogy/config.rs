//! Configuration for family tree generation.

use std::path::Path;
use serde::{Serialize, Deserialize};

use super::error::{GenealogyError, Result};

/// Configuration parameters for growing a family tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Birth year of the founding couple, also the floor for partner birth years.
    pub start_year: i32,

    /// No child is born after this year.
    pub end_year: i32,

    /// RNG seed (random if not set).
    pub seed: Option<u64>,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            start_year: 1950,
            end_year: 2120,
            seed: None,
        }
    }
}

impl TreeConfig {
    pub fn new(start_year: i32, end_year: i32) -> Self {
        Self { start_year, end_year, seed: None }
    }

    /// Read a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: TreeConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start_year > self.end_year {
            return Err(GenealogyError::InvalidConfig(format!(
                "start year {} is after end year {}",
                self.start_year, self.end_year,
            )));
        }
        Ok(())
    }
}
