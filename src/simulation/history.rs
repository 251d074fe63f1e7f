//! Rolling fitness history across generations.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::evolution::GenerationReport;

/// Rolling record of recent generation reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationHistory {
    /// Recent reports, oldest first.
    pub reports: VecDeque<GenerationReport>,
    /// Maximum number of reports to keep.
    pub max_history: usize,
}

impl Default for GenerationHistory {
    fn default() -> Self {
        Self::new(100) // Track last 100 generations
    }
}

impl GenerationHistory {
    /// Creates an empty history holding at most `max_history` reports.
    pub fn new(max_history: usize) -> Self {
        Self {
            reports: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Records a report, dropping the oldest once full.
    pub fn push(&mut self, report: GenerationReport) {
        self.reports.push_back(report);
        while self.reports.len() > self.max_history {
            self.reports.pop_front();
        }
    }

    /// Most recent report.
    pub fn latest(&self) -> Option<&GenerationReport> {
        self.reports.back()
    }

    /// Number of reports tracked.
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no generation has finished yet.
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Mean of the per-generation best fitness over the last `n` reports.
    pub fn avg_best_fitness(&self, n: usize) -> f64 {
        mean(self.reports.iter().rev().take(n).map(|r| r.best_fitness))
    }

    /// Mean of the per-generation average fitness over the last `n` reports.
    pub fn avg_average_fitness(&self, n: usize) -> f64 {
        mean(self.reports.iter().rev().take(n).map(|r| r.average_fitness))
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}
