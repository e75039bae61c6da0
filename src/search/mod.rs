//! This module defines the search layer: it runs a pool of preprocessors on an
//! input image and lets a selection oracle pick the winner through a
//! batch-elimination tournament.
//!
//! The registry owns the candidate pool; this module only evaluates the pool
//! it is handed and reports back.

use std::fmt;
use std::sync::Arc;

use crate::config::{SearchConfig, StrategyKind};
use crate::error::{PrepCvError, Result};
use crate::pipeline::Preprocessor;
use crate::types::Image;

//==================================================================================
// 1. Module Declarations
//==================================================================================

pub mod oracle;
pub mod selector;
mod strategies;

//==================================================================================
// 2. Public API Re-exports
//==================================================================================
pub use self::oracle::{
    build_oracle, Batch, BatchEntry, ScoreOracle, ScriptedOracle, Selection, SelectionOracle,
    TerminalOracle,
};
pub use self::selector::{SelectionOutcome, Selector};
pub use self::strategies::GridSearch;

/// **CONTRACT:** Optional post-processing applied to every candidate output
/// before it is shown to the selector.
pub trait Scorer {
    fn process(&self, image: &Image) -> Result<Image>;
}

impl<F> Scorer for F
where
    F: Fn(&Image) -> Result<Image>,
{
    fn process(&self, image: &Image) -> Result<Image> {
        self(image)
    }
}

/// A preprocessor can score the outputs of other preprocessors.
impl Scorer for Preprocessor {
    fn process(&self, image: &Image) -> Result<Image> {
        self.run(image)
    }
}

/// A candidate that was excluded because it (or the scorer) failed.
#[derive(Debug)]
pub struct CandidateFailure {
    /// Index into the candidate pool.
    pub index: usize,
    pub label: String,
    pub error: PrepCvError,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "candidate {} ({}): {}", self.index, self.label, self.error)
    }
}

/// **CONTRACT:** The unified result of any search strategy.
#[derive(Debug)]
pub struct SearchReport {
    /// `None` when the selection was cancelled.
    pub winner: Option<Arc<Preprocessor>>,
    /// Index of the winner in the candidate pool.
    pub winner_index: Option<usize>,
    pub oracle_rounds: usize,
    pub cancelled: bool,
    /// Number of candidates that were run.
    pub evaluated: usize,
    pub failures: Vec<CandidateFailure>,
}

impl SearchReport {
    pub fn is_complete(&self) -> bool {
        self.winner.is_some()
    }
}

/// The closed set of search strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    GridSearch(GridSearch),
}

impl Default for SearchStrategy {
    fn default() -> Self {
        SearchStrategy::GridSearch(GridSearch)
    }
}

impl SearchStrategy {
    pub fn from_config(config: &SearchConfig) -> Self {
        match config.strategy {
            StrategyKind::GridSearch => SearchStrategy::GridSearch(GridSearch),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SearchStrategy::GridSearch(_) => "grid search",
        }
    }

    /// Evaluates `candidates` on `input` and runs the selection.
    ///
    /// # Errors
    /// `NoCandidates` for an empty pool, `AllCandidatesFailed` when nothing
    /// survives the trial runs, and any protocol or I/O error raised during
    /// selection.
    pub fn search(
        &self,
        candidates: &[Arc<Preprocessor>],
        input: &Image,
        scorer: Option<&dyn Scorer>,
        selector: &mut Selector<'_>,
    ) -> Result<SearchReport> {
        match self {
            SearchStrategy::GridSearch(strategy) => {
                strategy.search(candidates, input, scorer, selector)
            }
        }
    }
}
