// In: src/experiment.rs

//! JSON experiment files and winner export.
//!
//! An experiment file names operations from an [`OperationCatalog`] and lists
//! parameter candidates in document order:
//!
//! ```json
//! {
//!   "search": { "batch_size": 4, "oracle": "terminal" },
//!   "pipelines": [
//!     {
//!       "name": "adaptive",
//!       "stages": [
//!         { "operation": "grayscale" },
//!         { "operation": "adaptive_threshold", "params": { "blockSize": [3, 5], "C": 2 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Arrays are candidate lists and scalars are single values. Structuring
//! elements use the `ndarray` serde form (`{"v": 1, "dim": [3, 3], "data": [...]}`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::kernels::OperationCatalog;
use crate::pipeline::{PipelineDescription, PipelineRegistry, ResolvedPipelineDescription};
use crate::types::ParamSpec;

//==================================================================================
// 1. Experiment Files
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StageEntry {
    pub operation: String,
    #[serde(default)]
    pub params: ParamSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PipelineEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub stages: Vec<StageEntry>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ExperimentFile {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pipelines: Vec<PipelineEntry>,
}

fn build_stages(stages: &[StageEntry], catalog: &OperationCatalog) -> Result<PipelineDescription> {
    let entries = stages
        .iter()
        .map(|stage| Ok((catalog.get(&stage.operation)?, stage.params.clone())))
        .collect::<Result<Vec<_>>>()?;
    PipelineDescription::new(entries)
}

impl ExperimentFile {
    /// Parses a JSON document and validates its search section.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let experiment: ExperimentFile = serde_json::from_str(json)?;
        experiment.search.validate()?;
        Ok(experiment)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Builds one validated description per pipeline entry, in file order.
    ///
    /// # Errors
    /// `UnknownOperation` for a name missing from `catalog`, or any
    /// construction error of the description itself.
    pub fn build_descriptions(&self, catalog: &OperationCatalog) -> Result<Vec<PipelineDescription>> {
        self.pipelines
            .iter()
            .map(|pipeline| build_stages(&pipeline.stages, catalog))
            .collect()
    }

    /// Registers every pipeline of the file. Nothing is registered unless
    /// every description builds.
    ///
    /// # Returns
    /// The total number of preprocessors added.
    pub fn register_all(
        &self,
        catalog: &OperationCatalog,
        registry: &mut PipelineRegistry,
    ) -> Result<usize> {
        let descriptions = self.build_descriptions(catalog)?;
        let added: usize = descriptions.iter().map(|d| registry.register(d)).sum();
        log::info!(
            "Registered {} preprocessor(s) from {} pipeline description(s)",
            added,
            descriptions.len()
        );
        Ok(added)
    }
}

//==================================================================================
// 2. Winner Export
//==================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WinnerStage {
    pub operation: String,
    pub params: ParamSpec,
}

/// The exported form of a winning preprocessor.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WinnerRecord {
    /// Version of the library that produced the record.
    pub version: String,
    pub stages: Vec<WinnerStage>,
}

impl WinnerRecord {
    pub fn from_description(description: &ResolvedPipelineDescription) -> Self {
        Self {
            version: crate::VERSION.to_string(),
            stages: description
                .stages()
                .iter()
                .map(|stage| WinnerStage {
                    operation: stage.name().to_string(),
                    params: stage.params().to_spec(),
                })
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Rebuilds the winning pipeline as a single-valued description.
    pub fn to_description(&self, catalog: &OperationCatalog) -> Result<PipelineDescription> {
        let stages: Vec<StageEntry> = self
            .stages
            .iter()
            .map(|s| StageEntry {
                operation: s.operation.clone(),
                params: s.params.clone(),
            })
            .collect();
        build_stages(&stages, catalog)
    }
}
