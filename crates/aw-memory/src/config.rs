//! Store configuration.
//!
//! The dream pass's randomness is explicit configuration rather than
//! hard-coded constants, so tests can pin a seeded RNG against known
//! parameters.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Parameters of the dream pass.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DreamConfig {
    /// Candidate pairs drawn per pass (2 × pairs records sampled).
    pub pairs: usize,
    /// Per-pair chance of actually creating a link.
    pub link_probability: f64,
    /// Link strength is drawn uniformly from [0, max_strength).
    pub max_strength: f64,
}

impl Default for DreamConfig {
    fn default() -> Self {
        Self {
            pairs: 10,
            link_probability: 0.3,
            max_strength: 0.5,
        }
    }
}

/// Top-level TOML configuration file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub dream: DreamConfig,
}

impl StoreConfig {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| StoreError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| StoreError::Config(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml(&content)
    }
}
