//! Runtime configuration: scoring weights, search options and log level.
//!
//! Loaded from JSON or YAML (by extension). A missing file means defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimizer::scorer::ScoringWeights;
use crate::optimizer::search::SearchOptions;

pub const DEFAULT_CONFIG_PATH: &str = "raidcomp.yaml";
pub const CONFIG_PATH_ENV: &str = "RAIDCOMP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaidcompConfig {
    /// `tracing` filter directive used when `RAIDCOMP_LOG` is unset.
    pub log_level: String,
    pub scoring: ScoringWeights,
    pub search: SearchOptions,
    /// Refuse to build when the estimated number of scored assignments exceeds this.
    pub max_search_space: Option<u64>,
}

impl Default for RaidcompConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            scoring: ScoringWeights::default(),
            search: SearchOptions::default(),
            max_search_space: None,
        }
    }
}

impl RaidcompConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str::<Self>(raw)?.validated()
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str::<Self>(raw)?.validated()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&raw),
            _ => Self::from_yaml_str(&raw),
        }
    }

    /// Like [RaidcompConfig::load] but a missing file yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.scoring.duplicate_penalty < 0 {
            return Err(ConfigError::Invalid(
                "scoring.duplicate_penalty must not be negative".to_string(),
            ));
        }
        if self.log_level.trim().is_empty() {
            return Err(ConfigError::Invalid("log_level must not be empty".to_string()));
        }
        Ok(self)
    }
}
