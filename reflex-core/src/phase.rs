use serde::{Deserialize, Serialize};

/// Phase of a single stimulus-response cycle
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Waiting for the first input of a session
    Idle,
    /// Stimulus scheduled but not yet shown
    Armed,
    /// Stimulus shown, clock running
    Stimulus,
    /// Input arrived while armed
    Premature,
    /// Last trial's elapsed time is available
    Settled,
}

impl Default for Phase {
    fn default() -> Self {
        Phase::Idle
    }
}

impl Phase {
    /// True while a deferred stimulus callback is outstanding
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Armed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "Click anywhere to start",
            Phase::Armed => "Wait for green...",
            Phase::Stimulus => "Click!",
            Phase::Premature => "Too soon! Click to try again",
            Phase::Settled => "Click to keep going",
        }
    }
}
