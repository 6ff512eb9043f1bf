use reflex_timing::TimerId;

/// Outstanding stimulus callback for the current cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStimulus {
    pub timer: TimerId,
    pub delay_ms: u64,
}

/// Internal cycle state. Carries exactly the data each phase owns, so a
/// pending callback can only exist while armed and a start timestamp only
/// while the stimulus is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cycle {
    Idle,
    Armed(PendingStimulus),
    Stimulus { start_ns: u64 },
    Premature,
    Settled { elapsed_ms: u64 },
}

impl Cycle {
    pub(crate) fn phase(&self) -> reflex_core::Phase {
        use reflex_core::Phase;
        match self {
            Cycle::Idle => Phase::Idle,
            Cycle::Armed(_) => Phase::Armed,
            Cycle::Stimulus { .. } => Phase::Stimulus,
            Cycle::Premature => Phase::Premature,
            Cycle::Settled { .. } => Phase::Settled,
        }
    }
}

/// What a single input did to the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Session already holds its maximum number of trials
    Ignored,
    /// A new cycle started; the stimulus appears after `delay_ms`
    Armed { delay_ms: u64 },
    /// Input arrived before the stimulus; the pending callback was cancelled
    TooEarly,
    /// A valid trial was recorded
    Recorded { elapsed_ms: u64 },
}
