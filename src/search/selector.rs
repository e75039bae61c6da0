// In: src/search/selector.rs

//! Batch-elimination tournament over candidate outputs.
//!
//! The pool starts as every candidate index in order. Each round presents the
//! current best (if any) followed by the next candidates from the front of the
//! pool, up to `batch_size` entries in total. The oracle's pick becomes the
//! new current best. When the pool is empty the current best is the winner.
//!
//! The first round consumes `batch_size` candidates and every later round
//! consumes `batch_size - 1`, so a pool of `N` takes at most
//! `ceil((N - 1) / (batch_size - 1))` rounds.

use std::collections::VecDeque;

use crate::config::{validate_batch_size, SearchConfig};
use crate::error::{PrepCvError, Result};
use crate::search::oracle::{Batch, BatchEntry, Selection, SelectionOracle};
use crate::types::Image;
use crate::utils::div_ceil;

/// How a tournament ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// There was nothing to choose from.
    Empty,
    /// `index` into the presented outputs, after `rounds` oracle calls.
    Winner { index: usize, rounds: usize },
    /// The oracle cancelled during round `rounds`.
    Cancelled { rounds: usize },
}

impl SelectionOutcome {
    pub fn rounds(&self) -> usize {
        match self {
            SelectionOutcome::Empty => 0,
            SelectionOutcome::Winner { rounds, .. } | SelectionOutcome::Cancelled { rounds } => *rounds,
        }
    }
}

pub struct Selector<'o> {
    batch_size: usize,
    oracle: &'o mut dyn SelectionOracle,
}

impl<'o> Selector<'o> {
    /// # Errors
    /// `PrepCvError::InvalidConfig` unless `batch_size` is in `2..=9`.
    pub fn new(batch_size: usize, oracle: &'o mut dyn SelectionOracle) -> Result<Self> {
        validate_batch_size(batch_size)?;
        Ok(Self { batch_size, oracle })
    }

    pub fn from_config(config: &SearchConfig, oracle: &'o mut dyn SelectionOracle) -> Result<Self> {
        Self::new(config.batch_size, oracle)
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Runs the tournament over `outputs`, labelled by `labels` (same length).
    pub fn select(&mut self, labels: &[String], outputs: &[Image]) -> Result<SelectionOutcome> {
        if labels.len() != outputs.len() {
            return Err(PrepCvError::Protocol(format!(
                "{} labels for {} outputs",
                labels.len(),
                outputs.len()
            )));
        }

        match outputs.len() {
            0 => return Ok(SelectionOutcome::Empty),
            1 => {
                log::debug!("Single candidate; selecting it without consulting the oracle.");
                return Ok(SelectionOutcome::Winner { index: 0, rounds: 0 });
            }
            _ => {}
        }

        log::debug!(
            "Selecting among {} outputs in batches of {} (at most {} rounds)",
            outputs.len(),
            self.batch_size,
            div_ceil(outputs.len() - 1, self.batch_size - 1)
        );
        let mut pool: VecDeque<usize> = (0..outputs.len()).collect();
        let mut best: Option<usize> = None;
        let mut rounds = 0;

        while !pool.is_empty() {
            let take = match best {
                Some(_) => self.batch_size - 1,
                None => self.batch_size,
            };
            let members: Vec<usize> = best
                .into_iter()
                .chain(std::iter::from_fn(|| pool.pop_front()).take(take))
                .collect();
            rounds += 1;

            let batch = Batch {
                round: rounds,
                entries: members
                    .iter()
                    .enumerate()
                    .map(|(i, &index)| BatchEntry {
                        position: i + 1,
                        candidate_index: index,
                        label: &labels[index],
                        image: &outputs[index],
                        incumbent: best == Some(index),
                    })
                    .collect(),
            };
            log::debug!(
                "Selection round {}: presenting candidates {:?} ({} left in pool)",
                rounds,
                members,
                pool.len()
            );

            match self.oracle.choose_best(&batch)? {
                Selection::Chosen(position) if (1..=members.len()).contains(&position) => {
                    best = Some(members[position - 1]);
                }
                Selection::Chosen(position) => {
                    return Err(PrepCvError::Protocol(format!(
                        "round {} chose position {}, but the batch holds positions 1-{}",
                        rounds,
                        position,
                        members.len()
                    )));
                }
                Selection::Cancel => {
                    log::info!("Selection cancelled in round {}.", rounds);
                    return Ok(SelectionOutcome::Cancelled { rounds });
                }
            }
        }

        log_metric!("event" = "selection", "candidates" = &outputs.len(), "rounds" = &rounds);
        match best {
            Some(index) => Ok(SelectionOutcome::Winner { index, rounds }),
            None => Err(PrepCvError::Protocol(
                "pool exhausted without a selection".to_string(),
            )),
        }
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::oracle::{ScoreOracle, ScriptedOracle};
    use crate::types::image::uniform;

    fn outputs(values: &[u8]) -> (Vec<String>, Vec<Image>) {
        let labels = (0..values.len()).map(|i| format!("candidate {}", i)).collect();
        let images = values.iter().map(|&v| uniform(2, 2, 1, v)).collect();
        (labels, images)
    }

    #[test]
    fn test_empty_and_single_pool() {
        let mut oracle = ScriptedOracle::default();
        let mut selector = Selector::new(4, &mut oracle).unwrap();

        let (labels, images) = outputs(&[]);
        assert_eq!(selector.select(&labels, &images).unwrap(), SelectionOutcome::Empty);

        let (labels, images) = outputs(&[7]);
        assert_eq!(
            selector.select(&labels, &images).unwrap(),
            SelectionOutcome::Winner { index: 0, rounds: 0 }
        );
        drop(selector);
        assert_eq!(oracle.calls(), 0);
    }

    #[test]
    fn test_batches_carry_incumbent_first() {
        let (labels, images) = outputs(&[0; 7]);
        let mut oracle = ScriptedOracle::new([
            Selection::Chosen(3),
            Selection::Chosen(1),
            Selection::Chosen(2),
        ]);
        let mut selector = Selector::new(3, &mut oracle).unwrap();
        let outcome = selector.select(&labels, &images).unwrap();
        drop(selector);

        assert_eq!(outcome, SelectionOutcome::Winner { index: 5, rounds: 3 });
        assert_eq!(
            oracle.batches_seen(),
            &[vec![0, 1, 2], vec![2, 3, 4], vec![2, 5, 6]]
        );
    }

    #[test]
    fn test_round_bound_holds_for_every_pool_size() {
        for batch_size in 2..=9 {
            for n in 2..40 {
                let values: Vec<u8> = (0..n).map(|i| (i * 5) as u8).collect();
                let (labels, images) = outputs(&values);
                let mut oracle = ScoreOracle::mean_intensity();
                let mut selector = Selector::new(batch_size, &mut oracle).unwrap();
                let outcome = selector.select(&labels, &images).unwrap();

                assert!(matches!(outcome, SelectionOutcome::Winner { index, .. } if index == n - 1));
                assert!(outcome.rounds() <= div_ceil(n - 1, batch_size - 1));
            }
        }
    }

    #[test]
    fn test_cancel_stops_immediately() {
        let (labels, images) = outputs(&[0; 10]);
        let mut oracle = ScriptedOracle::new([Selection::Chosen(1), Selection::Cancel]);
        let mut selector = Selector::new(4, &mut oracle).unwrap();
        assert_eq!(
            selector.select(&labels, &images).unwrap(),
            SelectionOutcome::Cancelled { rounds: 2 }
        );
        drop(selector);
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn test_out_of_range_position_is_protocol_error() {
        let (labels, images) = outputs(&[0; 3]);
        for bad in [0, 4] {
            let mut oracle = ScriptedOracle::new([Selection::Chosen(bad)]);
            let mut selector = Selector::new(4, &mut oracle).unwrap();
            assert!(matches!(
                selector.select(&labels, &images),
                Err(PrepCvError::Protocol(_))
            ));
        }
    }

    #[test]
    fn test_batch_size_is_validated() {
        let mut oracle = ScriptedOracle::default();
        assert!(matches!(Selector::new(1, &mut oracle), Err(PrepCvError::InvalidConfig(_))));
        assert!(matches!(Selector::new(10, &mut oracle), Err(PrepCvError::InvalidConfig(_))));
        assert!(Selector::new(9, &mut oracle).is_ok());
    }
}
