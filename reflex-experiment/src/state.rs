use super::config::{ConfigError, ReactionConfig};
use super::session::Session;
use super::trial::{Cycle, InputOutcome, PendingStimulus};
use reflex_core::{Phase, SessionReport, Summary, TrendPoint, Trial};
use reflex_timing::{Clock, Scheduler, TimerId};
use rand::Rng;
use std::time::Duration;

/// Trial state machine fused with its session aggregator.
///
/// Driven by two event sources only: [`on_user_input`](Self::on_user_input)
/// for pointer/tap events and [`on_timer_fired`](Self::on_timer_fired) for
/// the deferred stimulus callback. Both take `&mut self`, so a response can
/// never observe a half-applied transition.
pub struct ReactionStateMachine<C, S, R>
where
    C: Clock,
    S: Scheduler,
    R: Rng,
{
    clock: C,
    scheduler: S,
    rng: R,
    config: ReactionConfig,
    session: Session,
    cycle: Cycle,
}

impl<C, S, R> ReactionStateMachine<C, S, R>
where
    C: Clock,
    S: Scheduler,
    R: Rng,
{
    pub fn new(config: ReactionConfig, clock: C, scheduler: S, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            clock,
            scheduler,
            rng,
            session: Session::new(config.max_attempts),
            config,
            cycle: Cycle::Idle,
        })
    }

    /// Routes one discrete user input through the current phase
    pub fn on_user_input(&mut self) -> InputOutcome {
        match self.cycle {
            Cycle::Idle | Cycle::Premature | Cycle::Settled { .. } => self.start_cycle(),
            Cycle::Armed(pending) => {
                self.scheduler.cancel(pending.timer);
                self.cycle = Cycle::Premature;
                tracing::debug!(timer = pending.timer.raw(), "too early, stimulus cancelled");
                InputOutcome::TooEarly
            }
            Cycle::Stimulus { start_ns } => {
                let now_ns = self.clock.now();
                let trial = Trial::from_timestamps(start_ns, now_ns);
                let elapsed_ms = trial.elapsed_ms();
                self.session.append(trial);
                self.cycle = Cycle::Settled { elapsed_ms };
                tracing::info!(
                    attempt = self.session.attempts(),
                    elapsed_ms,
                    "trial recorded"
                );
                if self.session.is_complete() {
                    if let Some(summary) = self.session.summary() {
                        tracing::info!(
                            count = summary.count,
                            mean_ms = summary.mean_ms,
                            min_ms = summary.min_ms,
                            max_ms = summary.max_ms,
                            "session complete"
                        );
                    }
                }
                InputOutcome::Recorded { elapsed_ms }
            }
        }
    }

    /// Delivers a due timer. Anything but the live stimulus handle is stale
    /// and has no effect.
    pub fn on_timer_fired(&mut self, id: TimerId) -> bool {
        match self.cycle {
            Cycle::Armed(pending) if pending.timer == id => {
                let start_ns = self.clock.now();
                self.cycle = Cycle::Stimulus { start_ns };
                tracing::debug!(start_ns, delay_ms = pending.delay_ms, "stimulus shown");
                true
            }
            _ => {
                tracing::trace!(timer = id.raw(), phase = ?self.phase(), "ignoring stale timer");
                false
            }
        }
    }

    /// Drains the scheduler's due timers into [`on_timer_fired`](Self::on_timer_fired).
    /// Returns true if the phase changed.
    pub fn poll_timers(&mut self) -> bool {
        let mut changed = false;
        for id in self.scheduler.take_due() {
            changed |= self.on_timer_fired(id);
        }
        changed
    }

    /// Clears the session, cancels any pending stimulus and returns to idle
    pub fn reset(&mut self) {
        if let Cycle::Armed(pending) = self.cycle {
            self.scheduler.cancel(pending.timer);
        }
        self.session.reset();
        self.cycle = Cycle::Idle;
        tracing::debug!("session reset");
    }

    fn start_cycle(&mut self) -> InputOutcome {
        if self.session.is_complete() {
            tracing::trace!("session complete, input ignored");
            return InputOutcome::Ignored;
        }
        let (min, max) = self.config.delay_range_ms;
        let delay_ms = self.rng.random_range(min..=max);
        let timer = self.scheduler.schedule(Duration::from_millis(delay_ms));
        self.cycle = Cycle::Armed(PendingStimulus { timer, delay_ms });
        tracing::debug!(
            attempt = self.session.attempts() + 1,
            delay_ms,
            "armed"
        );
        InputOutcome::Armed { delay_ms }
    }

    pub fn phase(&self) -> Phase {
        self.cycle.phase()
    }

    /// Elapsed time of the trial just recorded; only present while settled
    pub fn last_elapsed_ms(&self) -> Option<u64> {
        match self.cycle {
            Cycle::Settled { elapsed_ms } => Some(elapsed_ms),
            _ => None,
        }
    }

    pub fn pending_stimulus(&self) -> Option<PendingStimulus> {
        match self.cycle {
            Cycle::Armed(pending) => Some(pending),
            _ => None,
        }
    }

    pub fn trials(&self) -> Vec<u64> {
        self.session.trials_ms()
    }

    pub fn summary(&self) -> Option<Summary> {
        self.session.summary()
    }

    pub fn trend(&self) -> Vec<TrendPoint> {
        self.session.trend()
    }

    pub fn report(&self) -> SessionReport {
        self.session.report()
    }

    pub fn is_complete(&self) -> bool {
        self.session.is_complete()
    }

    pub fn attempts(&self) -> usize {
        self.session.attempts()
    }

    pub fn attempts_remaining(&self) -> usize {
        self.session.attempts_remaining()
    }

    pub fn config(&self) -> &ReactionConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}
