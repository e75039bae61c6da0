// In: src/pipeline/registry.rs

//! The registry of every preprocessor under consideration.
//!
//! The registry is a plain value owned by the caller. Registration and search
//! both take `&mut self`, so they cannot interleave; share it across threads
//! behind an `Arc<Mutex<_>>` if needed.

use std::sync::Arc;

use crate::config::SearchConfig;
use crate::error::Result;
use crate::pipeline::description::PipelineDescription;
use crate::pipeline::expander::{count_combinations, resolve};
use crate::pipeline::preprocessor::Preprocessor;
use crate::search::{Scorer, SearchReport, SearchStrategy, SelectionOracle, Selector};
use crate::types::Image;

#[derive(Debug, Default)]
pub struct PipelineRegistry {
    all: Vec<Arc<Preprocessor>>,
    newly_added: Vec<Arc<Preprocessor>>,
    cached_best: Option<Arc<Preprocessor>>,
}

impl PipelineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `description` and registers one preprocessor per combination.
    ///
    /// # Returns
    /// The number of preprocessors added.
    pub fn register(&mut self, description: &PipelineDescription) -> usize {
        let count = count_combinations(description);
        log::info!(
            "Registering {} preprocessor(s) from {}",
            count,
            description
        );

        for resolved in resolve(description) {
            let preprocessor = Arc::new(Preprocessor::new(resolved));
            self.all.push(Arc::clone(&preprocessor));
            self.newly_added.push(preprocessor);
        }
        log_metric!(
            "event" = "register",
            "added" = &count,
            "total" = &self.all.len(),
            "pending" = &self.newly_added.len()
        );
        count
    }

    /// Runs `strategy` over the candidate pool and records the winner.
    ///
    /// The pool is every registered preprocessor when `cold_start` is set and
    /// only those added since the last completed search otherwise. A
    /// completed search caches the winner and clears the pending list; a
    /// cancelled or failed one leaves the registry untouched.
    pub fn run_search(
        &mut self,
        input: &Image,
        strategy: &SearchStrategy,
        scorer: Option<&dyn Scorer>,
        selector: &mut Selector<'_>,
        cold_start: bool,
    ) -> Result<SearchReport> {
        let pool = if cold_start {
            &self.all
        } else {
            &self.newly_added
        };
        log::info!(
            "Starting {} over {} candidate(s) (cold_start={})",
            strategy.name(),
            pool.len(),
            cold_start
        );

        let report = strategy.search(pool, input, scorer, selector)?;

        match &report.winner {
            Some(winner) => {
                log::info!("Search completed. Winner: {}", winner.label());
                self.cached_best = Some(Arc::clone(winner));
                self.newly_added.clear();
            }
            None => {
                log::info!("Search cancelled after {} round(s); registry unchanged", report.oracle_rounds);
            }
        }
        Ok(report)
    }

    /// [`run_search`](Self::run_search) driven by a [`SearchConfig`].
    pub fn run_search_with_config(
        &mut self,
        input: &Image,
        config: &SearchConfig,
        scorer: Option<&dyn Scorer>,
        oracle: &mut dyn SelectionOracle,
    ) -> Result<SearchReport> {
        let strategy = SearchStrategy::from_config(config);
        let mut selector = Selector::from_config(config, oracle)?;
        self.run_search(input, &strategy, scorer, &mut selector, config.cold_start)
    }

    /// The cached winner, or `None` if there is none or it is stale.
    ///
    /// A winner is stale once preprocessors have been registered after the
    /// search that chose it; the cache is then dropped and a warning logged.
    pub fn get_best(&mut self) -> Option<Arc<Preprocessor>> {
        if !self.newly_added.is_empty() {
            self.cached_best = None;
            log::warn!(
                "{} preprocessor(s) were added since the last search. Run a new search to pick a winner.",
                self.newly_added.len()
            );
            return None;
        }
        self.cached_best.clone()
    }

    /// Drops every preprocessor and the cached winner.
    pub fn reset(&mut self) {
        self.all.clear();
        self.newly_added.clear();
        self.cached_best = None;
    }

    pub fn all(&self) -> &[Arc<Preprocessor>] {
        &self.all
    }

    pub fn newly_added(&self) -> &[Arc<Preprocessor>] {
        &self.newly_added
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}
