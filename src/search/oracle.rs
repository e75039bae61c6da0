// In: src/search/oracle.rs

//! The selection oracles: whoever or whatever picks the best entry of a batch.
//!
//! The selector only ever sees the [`SelectionOracle`] trait. Rendering and
//! input handling belong to the oracle, so a terminal prompt, an automatic
//! comparator and a scripted test double are interchangeable.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

use colored::Colorize;

use crate::config::OracleKind;
use crate::error::{PrepCvError, Result};
use crate::types::image::{describe_shape, foreground_ratio, mean_intensity};
use crate::types::Image;

//==================================================================================
// 1. Protocol Types
//==================================================================================

/// The oracle's answer for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// 1-based position within the batch.
    Chosen(usize),
    Cancel,
}

/// One candidate output as presented to the oracle.
#[derive(Debug, Clone, Copy)]
pub struct BatchEntry<'a> {
    /// 1-based position within the batch; the value to return in
    /// [`Selection::Chosen`].
    pub position: usize,
    /// Index of the candidate in the original pool.
    pub candidate_index: usize,
    pub label: &'a str,
    pub image: &'a Image,
    /// True for the winner carried over from the previous round.
    pub incumbent: bool,
}

/// A round of the tournament.
#[derive(Debug, Clone)]
pub struct Batch<'a> {
    /// 1-based round number.
    pub round: usize,
    pub entries: Vec<BatchEntry<'a>>,
}

impl<'a> Batch<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn candidate_indices(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.candidate_index).collect()
    }
}

/// **CONTRACT:** Picks the best entry of a batch or cancels the search.
///
/// Returning a position outside `1..=batch.len()` is a protocol violation and
/// aborts the search.
pub trait SelectionOracle {
    fn choose_best(&mut self, batch: &Batch<'_>) -> Result<Selection>;
}

//==================================================================================
// 2. Automatic Comparator
//==================================================================================

type Metric = dyn Fn(&Image) -> f64 + Send + Sync;

/// Ranks each batch by an image metric. The highest score wins and ties go to
/// the lowest position, so the incumbent keeps its place on a tie.
pub struct ScoreOracle {
    name: String,
    metric: Box<Metric>,
}

impl ScoreOracle {
    pub fn new<F>(name: impl Into<String>, metric: F) -> Self
    where
        F: Fn(&Image) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            metric: Box::new(metric),
        }
    }

    pub fn mean_intensity() -> Self {
        Self::new("mean_intensity", mean_intensity)
    }

    pub fn foreground_ratio() -> Self {
        Self::new("foreground_ratio", foreground_ratio)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SelectionOracle for ScoreOracle {
    fn choose_best(&mut self, batch: &Batch<'_>) -> Result<Selection> {
        let mut best: Option<(usize, f64)> = None;
        for entry in &batch.entries {
            let score = (self.metric)(entry.image);
            log::debug!(
                "  - Round {} position {} ({}): {}={:.4}",
                batch.round,
                entry.position,
                entry.label,
                self.name,
                score
            );
            match best {
                Some((_, top)) if score <= top || score.is_nan() => {}
                _ => best = Some((entry.position, score)),
            }
        }
        best.map(|(position, _)| Selection::Chosen(position))
            .ok_or_else(|| PrepCvError::Protocol("cannot rank an empty batch".to_string()))
    }
}

//==================================================================================
// 3. Scripted Test Double
//==================================================================================

/// Replays a fixed list of responses and records every batch it was shown.
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    script: VecDeque<Selection>,
    seen: Vec<Vec<usize>>,
}

impl ScriptedOracle {
    pub fn new(script: impl IntoIterator<Item = Selection>) -> Self {
        Self {
            script: script.into_iter().collect(),
            seen: Vec::new(),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.len()
    }

    /// Candidate indices of every batch presented so far, in order.
    pub fn batches_seen(&self) -> &[Vec<usize>] {
        &self.seen
    }
}

impl SelectionOracle for ScriptedOracle {
    fn choose_best(&mut self, batch: &Batch<'_>) -> Result<Selection> {
        self.seen.push(batch.candidate_indices());
        self.script.pop_front().ok_or_else(|| {
            PrepCvError::Protocol(format!(
                "scripted oracle has no response left for round {}",
                batch.round
            ))
        })
    }
}

//==================================================================================
// 4. Terminal Prompt
//==================================================================================

/// Prompts a human on a line-oriented terminal.
///
/// Each entry is listed with its position, label, shape and mean intensity.
/// The user answers with a digit or `c` to cancel. Anything else re-prompts.
/// End of input cancels.
pub struct TerminalOracle<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> TerminalOracle<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }

    fn render(&mut self, batch: &Batch<'_>) -> io::Result<()> {
        writeln!(
            self.writer,
            "\n{}",
            format!("=== Round {}: {} candidates ===", batch.round, batch.len()).bold()
        )?;
        for entry in &batch.entries {
            let marker = if entry.incumbent { " (current best)" } else { "" };
            writeln!(
                self.writer,
                "  [{}] {}{} | {} | mean {:.1}",
                entry.position.to_string().cyan().bold(),
                entry.label,
                marker.green(),
                describe_shape(entry.image),
                mean_intensity(entry.image)
            )?;
        }
        Ok(())
    }

    fn parse(answer: &str, len: usize) -> Option<Selection> {
        let answer = answer.trim();
        if answer.eq_ignore_ascii_case("c") {
            return Some(Selection::Cancel);
        }
        match answer.parse::<usize>() {
            Ok(position) if (1..=len).contains(&position) => Some(Selection::Chosen(position)),
            _ => None,
        }
    }
}

impl TerminalOracle<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> SelectionOracle for TerminalOracle<R, W> {
    fn choose_best(&mut self, batch: &Batch<'_>) -> Result<Selection> {
        self.render(batch)?;
        loop {
            write!(
                self.writer,
                "Choose the best candidate (1-{}) or 'c' to cancel: ",
                batch.len()
            )?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                log::warn!("Input closed during selection; treating it as a cancel.");
                return Ok(Selection::Cancel);
            }
            match Self::parse(&line, batch.len()) {
                Some(selection) => return Ok(selection),
                None => writeln!(
                    self.writer,
                    "{}",
                    format!("'{}' is not a valid choice.", line.trim()).red()
                )?,
            }
        }
    }
}

/// Builds the oracle named by a configuration. The terminal oracle talks to
/// stdin and stdout.
pub fn build_oracle(kind: OracleKind) -> Box<dyn SelectionOracle> {
    match kind {
        OracleKind::Terminal => Box::new(TerminalOracle::stdio()),
        OracleKind::MeanIntensity => Box::new(ScoreOracle::mean_intensity()),
        OracleKind::ForegroundRatio => Box::new(ScoreOracle::foreground_ratio()),
    }
}

//==================================================================================
// Unit Tests
//==================================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::image::uniform;
    use std::io::Cursor;

    fn batch<'a>(images: &'a [Image], labels: &'a [String]) -> Batch<'a> {
        Batch {
            round: 1,
            entries: images
                .iter()
                .zip(labels)
                .enumerate()
                .map(|(i, (image, label))| BatchEntry {
                    position: i + 1,
                    candidate_index: i + 10,
                    label,
                    image,
                    incumbent: i == 0,
                })
                .collect(),
        }
    }

    fn fixture() -> (Vec<Image>, Vec<String>) {
        let images = vec![uniform(2, 2, 1, 10), uniform(2, 2, 1, 200), uniform(2, 2, 1, 200)];
        let labels = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        (images, labels)
    }

    #[test]
    fn test_score_oracle_highest_wins_ties_to_lowest_position() {
        let (images, labels) = fixture();
        let mut oracle = ScoreOracle::mean_intensity();
        assert_eq!(oracle.choose_best(&batch(&images, &labels)).unwrap(), Selection::Chosen(2));
    }

    #[test]
    fn test_scripted_oracle_replays_and_records() {
        let (images, labels) = fixture();
        let mut oracle = ScriptedOracle::new([Selection::Chosen(3)]);
        assert_eq!(oracle.choose_best(&batch(&images, &labels)).unwrap(), Selection::Chosen(3));
        assert_eq!(oracle.batches_seen(), &[vec![10, 11, 12]]);
        assert!(matches!(
            oracle.choose_best(&batch(&images, &labels)),
            Err(PrepCvError::Protocol(_))
        ));
        assert_eq!(oracle.calls(), 2);
    }

    #[test]
    fn test_terminal_oracle_reprompts_until_valid() {
        let (images, labels) = fixture();
        let input = Cursor::new("x\n7\n\n 2 \n");
        let mut oracle = TerminalOracle::new(input, Vec::new());
        let selection = oracle.choose_best(&batch(&images, &labels)).unwrap();
        assert_eq!(selection, Selection::Chosen(2));

        let (_, output) = oracle.into_inner();
        let text = String::from_utf8(output).unwrap();
        assert_eq!(text.matches("Choose the best candidate (1-3)").count(), 4);
        assert!(text.contains("'x' is not a valid choice."));
        assert!(text.contains("(current best)"));
    }

    #[test]
    fn test_build_oracle_for_automatic_kinds() {
        let (images, labels) = fixture();
        let mut oracle = build_oracle(OracleKind::ForegroundRatio);
        assert_eq!(oracle.choose_best(&batch(&images, &labels)).unwrap(), Selection::Chosen(1));
    }

    #[test]
    fn test_terminal_oracle_cancel_and_eof() {
        let (images, labels) = fixture();
        let mut oracle = TerminalOracle::new(Cursor::new("C\n"), Vec::new());
        assert_eq!(oracle.choose_best(&batch(&images, &labels)).unwrap(), Selection::Cancel);

        let mut oracle = TerminalOracle::new(Cursor::new(""), Vec::new());
        assert_eq!(oracle.choose_best(&batch(&images, &labels)).unwrap(), Selection::Cancel);
    }
}
