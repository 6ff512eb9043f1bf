use serde::{Deserialize, Serialize};

/// One completed, valid stimulus-response measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    elapsed_ms: u64,
}

impl Trial {
    pub fn new(elapsed_ms: u64) -> Self {
        Self { elapsed_ms }
    }

    /// Builds a trial from two monotonic nanosecond timestamps, rounding to the
    /// nearest millisecond. A response stamped before the stimulus counts as 0.
    pub fn from_timestamps(stimulus_ns: u64, response_ns: u64) -> Self {
        let delta_ns = response_ns.saturating_sub(stimulus_ns);
        Self::new((delta_ns + 500_000) / 1_000_000)
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }
}

/// A point on the attempt-vs-time trend chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// 1-based attempt number
    pub attempt: usize,
    pub time_ms: u64,
}
