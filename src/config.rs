//! Chain configuration

use crate::constants::CUT_OFF_AGE;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How the best tip is chosen between nodes of equal height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForkChoice {
    /// Keep the node that reached the height first
    #[default]
    FirstSeen,
    /// Prefer the lexicographically smaller block hash, independent of arrival order
    LowestHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    pub cut_off_age: u64,
    pub fork_choice: ForkChoice,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            cut_off_age: CUT_OFF_AGE,
            fork_choice: ForkChoice::default(),
        }
    }
}

impl ChainConfig {
    /// Parse a JSON config; absent fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
