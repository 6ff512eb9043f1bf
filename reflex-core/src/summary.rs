use serde::{Deserialize, Serialize};

use crate::trial::Trial;

/// Aggregate statistics over a non-empty set of trials
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub count: usize,
    /// Mean elapsed time, rounded half up
    pub mean_ms: u64,
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Summary {
    /// Returns `None` for an empty slice rather than a meaningless mean.
    pub fn from_trials(trials: &[Trial]) -> Option<Self> {
        let count = trials.len();
        if count == 0 {
            return None;
        }
        let mut sum: u64 = 0;
        let mut min_ms = u64::MAX;
        let mut max_ms = 0;
        for trial in trials {
            let ms = trial.elapsed_ms();
            sum += ms;
            min_ms = min_ms.min(ms);
            max_ms = max_ms.max(ms);
        }
        let n = count as u64;
        Some(Self {
            count,
            mean_ms: (sum + n / 2) / n,
            min_ms,
            max_ms,
        })
    }
}

/// Snapshot of a session for export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub max_attempts: usize,
    pub complete: bool,
    pub trials_ms: Vec<u64>,
    pub summary: Option<Summary>,
}
