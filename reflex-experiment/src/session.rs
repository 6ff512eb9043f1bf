use reflex_core::{SessionReport, Summary, TrendPoint, Trial};

/// Ordered, capped sequence of completed trials
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    max_attempts: usize,
    trials: Vec<Trial>,
}

impl Session {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            max_attempts,
            trials: Vec::with_capacity(max_attempts),
        }
    }

    /// Appends a trial. The caller must check [`Session::is_complete`] first;
    /// a trial offered to a full session is dropped.
    pub fn append(&mut self, trial: Trial) {
        debug_assert!(
            !self.is_complete(),
            "append on a complete session ({} trials)",
            self.trials.len()
        );
        if self.is_complete() {
            tracing::error!(elapsed_ms = trial.elapsed_ms(), "dropping trial past the cap");
            return;
        }
        self.trials.push(trial);
    }

    pub fn is_complete(&self) -> bool {
        self.trials.len() >= self.max_attempts
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::from_trials(&self.trials)
    }

    pub fn reset(&mut self) {
        self.trials.clear();
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn trials_ms(&self) -> Vec<u64> {
        self.trials.iter().map(Trial::elapsed_ms).collect()
    }

    pub fn attempts(&self) -> usize {
        self.trials.len()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.max_attempts.saturating_sub(self.trials.len())
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn trend(&self) -> Vec<TrendPoint> {
        self.trials
            .iter()
            .enumerate()
            .map(|(i, t)| TrendPoint {
                attempt: i + 1,
                time_ms: t.elapsed_ms(),
            })
            .collect()
    }

    pub fn report(&self) -> SessionReport {
        SessionReport {
            max_attempts: self.max_attempts,
            complete: self.is_complete(),
            trials_ms: self.trials_ms(),
            summary: self.summary(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session_with(ms: &[u64]) -> Session {
        let mut session = Session::new(5);
        for &m in ms {
            session.append(Trial::new(m));
        }
        session
    }

    #[test]
    fn keeps_attempt_order() {
        let session = session_with(&[300, 120, 250]);
        assert_eq!(session.trials_ms(), vec![300, 120, 250]);
        assert_eq!(session.attempts(), 3);
        assert_eq!(session.attempts_remaining(), 2);
        assert!(!session.is_complete());
    }

    #[test]
    fn complete_at_cap() {
        let session = session_with(&[1, 2, 3, 4, 5]);
        assert!(session.is_complete());
        assert_eq!(session.attempts_remaining(), 0);
    }

    #[test]
    fn summary_of_three_trials() {
        let summary = session_with(&[120, 200, 80]).summary().unwrap();
        assert_eq!(
            summary,
            Summary {
                count: 3,
                mean_ms: 133,
                min_ms: 80,
                max_ms: 200
            }
        );
    }

    #[test]
    fn empty_session_has_no_summary() {
        assert_eq!(Session::new(5).summary(), None);
    }

    #[test]
    fn trend_numbers_attempts_from_one() {
        let trend = session_with(&[210, 190]).trend();
        assert_eq!(
            trend,
            vec![
                TrendPoint {
                    attempt: 1,
                    time_ms: 210
                },
                TrendPoint {
                    attempt: 2,
                    time_ms: 190
                },
            ]
        );
    }

    #[test]
    fn reset_clears_trials() {
        let mut session = session_with(&[100, 200]);
        session.reset();
        assert!(session.trials().is_empty());
        assert_eq!(session.attempts_remaining(), 5);
        session.reset();
        assert!(session.trials().is_empty());
    }

    #[test]
    fn report_reflects_state() {
        let report = session_with(&[100, 200, 300, 400, 500]).report();
        assert!(report.complete);
        assert_eq!(report.max_attempts, 5);
        assert_eq!(report.trials_ms, vec![100, 200, 300, 400, 500]);
        assert_eq!(report.summary.map(|s| s.mean_ms), Some(300));
    }
}
