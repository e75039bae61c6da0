// In: src/search/strategies.rs
use std::sync::Arc;
use std::time::Instant;

use super::selector::{SelectionOutcome, Selector};
use super::{CandidateFailure, Scorer, SearchReport};
use crate::error::{PrepCvError, Result};
use crate::pipeline::Preprocessor;
use crate::types::image::describe_shape;
use crate::types::Image;

// Runs one candidate and, if present, the scorer on its output.
fn trial_run(candidate: &Preprocessor, input: &Image, scorer: Option<&dyn Scorer>) -> Result<Image> {
    let output = candidate.run(input)?;
    match scorer {
        Some(scorer) => scorer.process(&output),
        None => Ok(output),
    }
}

//
//==================================================================================
// --- Strategy 1: Grid Search ---
//==================================================================================

/// Exhaustive evaluation: every candidate is run on the input and every
/// surviving output goes to the selector, in original candidate order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GridSearch;

impl GridSearch {
    pub fn search(
        &self,
        candidates: &[Arc<Preprocessor>],
        input: &Image,
        scorer: Option<&dyn Scorer>,
        selector: &mut Selector<'_>,
    ) -> Result<SearchReport> {
        if candidates.is_empty() {
            return Err(PrepCvError::NoCandidates);
        }
        let start_overall = Instant::now();

        log::info!(
            "\n--- GRID SEARCH TRIAL RUNS ({} candidates on {} input) ---",
            candidates.len(),
            describe_shape(input)
        );

        let mut survivors = Vec::with_capacity(candidates.len());
        let mut labels = Vec::with_capacity(candidates.len());
        let mut outputs = Vec::with_capacity(candidates.len());
        let mut failures = Vec::new();

        for (index, candidate) in candidates.iter().enumerate() {
            let start_candidate = Instant::now();
            let label = candidate.label();
            match trial_run(candidate, input, scorer) {
                Ok(output) => {
                    let duration = start_candidate.elapsed();
                    log::info!(
                        "  - Candidate {:>3}: {:<60} | Output: {} | Time: {:.2?}",
                        index,
                        label,
                        describe_shape(&output),
                        duration,
                    );
                    survivors.push(index);
                    labels.push(label);
                    outputs.push(output);
                }
                Err(error) => {
                    log::warn!(
                        "  - Candidate {:>3}: {:<60} | FAILED TO EXECUTE: {}",
                        index,
                        label,
                        error
                    );
                    failures.push(CandidateFailure { index, label, error });
                }
            }
        }

        log::info!(
            "--- Trial runs total time: {:.2?} ({} succeeded, {} failed) ---",
            start_overall.elapsed(),
            survivors.len(),
            failures.len()
        );
        log_metric!(
            "event" = "grid_search_trials",
            "candidates" = &candidates.len(),
            "failed" = &failures.len()
        );

        if survivors.is_empty() {
            return Err(PrepCvError::AllCandidatesFailed(candidates.len()));
        }

        let outcome = selector.select(&labels, &outputs)?;
        let mut report = SearchReport {
            winner: None,
            winner_index: None,
            oracle_rounds: outcome.rounds(),
            cancelled: false,
            evaluated: candidates.len(),
            failures,
        };

        match outcome {
            SelectionOutcome::Winner { index, .. } => {
                // Map the surviving position back to the original candidate.
                let original = survivors[index];
                report.winner = Some(Arc::clone(&candidates[original]));
                report.winner_index = Some(original);
            }
            SelectionOutcome::Cancelled { .. } => report.cancelled = true,
            SelectionOutcome::Empty => {
                return Err(PrepCvError::Protocol(
                    "selector saw no outputs although candidates survived".to_string(),
                ))
            }
        }
        Ok(report)
    }
}
