// In: src/pipeline/preprocessor.rs

//! The executable form of a resolved description.

use std::fmt;

use crate::error::{PrepCvError, Result};
use crate::experiment::WinnerRecord;
use crate::pipeline::description::ResolvedPipelineDescription;
use crate::types::Image;

/// Runs the stages of one [`ResolvedPipelineDescription`] in order.
///
/// Execution never touches the caller's image: the input is cloned once and
/// each stage receives the previous stage's output by value.
#[derive(Debug, Clone)]
pub struct Preprocessor {
    description: ResolvedPipelineDescription,
}

impl Preprocessor {
    pub fn new(description: ResolvedPipelineDescription) -> Self {
        Self { description }
    }

    pub fn description(&self) -> &ResolvedPipelineDescription {
        &self.description
    }

    /// Applies every stage to a private copy of `input`.
    ///
    /// # Errors
    /// `PrepCvError::Execution` carrying the zero-based stage index, the
    /// operation name and the operation's own error. No partial output is
    /// returned.
    pub fn run(&self, input: &Image) -> Result<Image> {
        let mut current = input.clone();
        for (stage_index, stage) in self.description.stages().iter().enumerate() {
            current = stage
                .operation()
                .apply(current, stage.params())
                .map_err(|source| PrepCvError::Execution {
                    stage: stage_index,
                    operation: stage.name().to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(current)
    }

    /// One-line summary used as the candidate label during selection,
    /// e.g. `grayscale {} -> adaptive_threshold {blockSize: 3}`.
    pub fn label(&self) -> String {
        if self.description.is_empty() {
            return "identity".to_string();
        }
        self.description
            .stages()
            .iter()
            .map(|s| format!("{} {}", s.name(), s.params()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    /// The serialisable export of this preprocessor's resolved description.
    pub fn to_record(&self) -> WinnerRecord {
        WinnerRecord::from_description(&self.description)
    }
}

impl fmt::Display for Preprocessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Preprocessor containing {}", self.description)
    }
}
