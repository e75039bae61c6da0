// In: src/config.rs

//! The single source of truth for search configuration.
//!
//! `SearchConfig` is created once at the application boundary (usually from
//! the `search` section of an experiment file) and then read by the registry
//! and the selector. Every field has a serde default, so `{}` is a valid
//! configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PrepCvError, Result};

//==================================================================================
// I. Configuration Enums
//==================================================================================

/// The search strategy used to evaluate the candidate pool.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyKind {
    /// **Default:** Run every candidate, then hand every output to the selector.
    #[default]
    GridSearch,
}

/// Who ranks each batch during selection.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// **Default:** A human at the terminal picks with keys `1`-`9`.
    #[default]
    Terminal,

    /// Automatic: the brightest output wins.
    MeanIntensity,

    /// Automatic: the output with the most non-zero pixels wins.
    ForegroundRatio,
}

//==================================================================================
// II. The Unified SearchConfig
//==================================================================================

/// Smallest batch that still compares two candidates.
pub const MIN_BATCH_SIZE: usize = 2;

/// Largest batch that still maps every position to a single digit key.
pub const MAX_BATCH_SIZE: usize = 9;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SearchConfig {
    /// Maximum number of candidates shown per selection round, including the
    /// current best.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// If true, every registered preprocessor competes, not only the ones
    /// added since the last completed search.
    #[serde(default)]
    pub cold_start: bool,

    #[serde(default)]
    pub strategy: StrategyKind,

    #[serde(default)]
    pub oracle: OracleKind,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            cold_start: false,
            strategy: StrategyKind::default(),
            oracle: OracleKind::default(),
        }
    }
}

impl SearchConfig {
    /// Rejects settings the selector cannot honour.
    pub fn validate(&self) -> Result<()> {
        validate_batch_size(self.batch_size)
    }

    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: SearchConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Shared by the config and by selectors constructed directly.
pub(crate) fn validate_batch_size(batch_size: usize) -> Result<()> {
    if !(MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&batch_size) {
        return Err(PrepCvError::InvalidConfig(format!(
            "batch_size must be between {} and {}, got {}",
            MIN_BATCH_SIZE, MAX_BATCH_SIZE, batch_size
        )));
    }
    Ok(())
}

/// Helper for `serde` to provide a default for `batch_size`.
fn default_batch_size() -> usize {
    4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = SearchConfig::from_json_str("{}").unwrap();
        assert_eq!(config, SearchConfig::default());
        assert_eq!(config.batch_size, 4);
        assert!(!config.cold_start);
        assert_eq!(config.strategy, StrategyKind::GridSearch);
        assert_eq!(config.oracle, OracleKind::Terminal);
    }

    #[test]
    fn test_full_document() {
        let json = r#"{
            "batch_size": 9,
            "cold_start": true,
            "strategy": { "kind": "grid_search" },
            "oracle": "foreground_ratio"
        }"#;
        let config = SearchConfig::from_json_str(json).unwrap();
        assert_eq!(config.batch_size, 9);
        assert!(config.cold_start);
        assert_eq!(config.oracle, OracleKind::ForegroundRatio);
    }

    #[test]
    fn test_batch_size_bounds() {
        for bad in [0, 1, 10] {
            let json = format!(r#"{{ "batch_size": {} }}"#, bad);
            assert!(matches!(
                SearchConfig::from_json_str(&json),
                Err(PrepCvError::InvalidConfig(_))
            ));
        }
        assert!(SearchConfig::from_json_str(r#"{ "batch_size": 2 }"#).is_ok());
    }

    #[test]
    fn test_malformed_json_is_a_serde_error() {
        assert!(matches!(
            SearchConfig::from_json_str("{ batch_size: }"),
            Err(PrepCvError::SerdeJson(_))
        ));
        assert!(matches!(
            SearchConfig::from_path("/definitely/not/here.json"),
            Err(PrepCvError::Io(_))
        ));
    }
}
