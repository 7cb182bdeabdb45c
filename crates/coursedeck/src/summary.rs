//! The synthetic summary slide.
//!
//! Rebuilt from scratch every time it becomes the active slide; score
//! records are transient and recomputed on demand, never persisted.

use crate::xapi::CompletedSignal;

/// Per-slide score aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub slide_index: usize,
    pub score: i32,
    pub max_score: i32,
    /// Ordinals (within the slide's element list) of the scored tasks.
    pub task_ordinals: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreTotals {
    pub total_score: i32,
    pub total_max_score: i32,
    pub total_percentage: u32,
}

/// Integer percentage with the 0/0 case clamped to 0 — a displayed
/// percentage must never be NaN.
pub fn percentage(score: i32, max_score: i32) -> u32 {
    if max_score <= 0 {
        return 0;
    }
    ((f64::from(score) / f64::from(max_score)) * 100.0).round() as u32
}

/// Action affordances the summary view exposes back to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryAction {
    ShowSolutions,
    Retry,
}

#[derive(Default)]
pub struct SummarySlide {
    records: Vec<ScoreRecord>,
    totals: ScoreTotals,
    completed_emitted: bool,
}

impl SummarySlide {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all content with a fresh score aggregation. Old rows are
    /// discarded wholesale.
    pub fn rebuild(&mut self, records: Vec<ScoreRecord>) {
        let total_score: i32 = records.iter().map(|r| r.score).sum();
        let total_max_score: i32 = records.iter().map(|r| r.max_score).sum();
        self.totals = ScoreTotals {
            total_score,
            total_max_score,
            total_percentage: percentage(total_score, total_max_score),
        };
        self.records = records;
    }

    pub fn records(&self) -> &[ScoreRecord] {
        &self.records
    }

    pub fn totals(&self) -> ScoreTotals {
        self.totals
    }

    /// Called when the summary slide is rendered. Emits the completion
    /// signal exactly once, and only outside solution mode.
    pub fn on_rendered(&mut self, solution_mode: bool) -> Option<CompletedSignal> {
        if self.completed_emitted || solution_mode {
            return None;
        }
        self.completed_emitted = true;
        Some(CompletedSignal {
            score: self.totals.total_score,
            max_score: self.totals.total_max_score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(slide_index: usize, score: i32, max_score: i32) -> ScoreRecord {
        ScoreRecord {
            slide_index,
            score,
            max_score,
            task_ordinals: vec![0],
        }
    }

    #[test]
    fn test_percentage_clamps_zero_over_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(3, 0), 0);
        assert_eq!(percentage(1, 2), 50);
        assert_eq!(percentage(2, 3), 67);
    }

    #[test]
    fn test_rebuild_aggregates() {
        let mut summary = SummarySlide::new();
        summary.rebuild(vec![record(0, 1, 2), record(2, 3, 3)]);
        let totals = summary.totals();
        assert_eq!(totals.total_score, 4);
        assert_eq!(totals.total_max_score, 5);
        assert_eq!(totals.total_percentage, 80);

        // A rebuild discards earlier rows entirely.
        summary.rebuild(vec![record(0, 0, 2)]);
        assert_eq!(summary.records().len(), 1);
        assert_eq!(summary.totals().total_percentage, 0);
    }

    #[test]
    fn test_completed_signal_emitted_once() {
        let mut summary = SummarySlide::new();
        summary.rebuild(vec![record(0, 2, 2)]);
        // Solution mode suppresses the signal and does not burn the latch.
        assert!(summary.on_rendered(true).is_none());
        let signal = summary.on_rendered(false).unwrap();
        assert_eq!(signal.score, 2);
        assert_eq!(signal.max_score, 2);
        assert!(summary.on_rendered(false).is_none());
    }
}
