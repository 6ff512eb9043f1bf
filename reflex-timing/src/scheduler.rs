use std::time::Duration;

use crate::clock::Clock;

/// Handle to a scheduled deferred callback. Never reused within one scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Schedule/cancel capability for deferred callbacks.
///
/// Callbacks do not run inside the scheduler. The event loop asks for the
/// timers that came due with [`Scheduler::take_due`] and delivers each one to
/// whoever scheduled it, so everything stays on a single logical thread.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerId;

    /// Returns true if the timer was still pending. Once this returns, the
    /// id will never be yielded by `take_due`.
    fn cancel(&mut self, id: TimerId) -> bool;

    /// Removes and returns every timer whose deadline has passed, earliest first.
    fn take_due(&mut self) -> Vec<TimerId>;
}

/// Cooperative scheduler that compares deadlines against a [`Clock`]
#[derive(Debug, Clone)]
pub struct DeadlineScheduler<C: Clock> {
    clock: C,
    next_id: u64,
    pending: Vec<(u64, TimerId)>,
}

impl<C: Clock> DeadlineScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            next_id: 0,
            pending: Vec::new(),
        }
    }

    /// Earliest pending deadline in clock nanoseconds
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.iter().map(|(deadline, _)| *deadline).min()
    }

    /// Time left until the earliest pending deadline, zero if already due
    pub fn time_until_next(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.next_deadline()
            .map(|deadline| Duration::from_nanos(deadline.saturating_sub(now)))
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|(_, t)| *t == id)
    }
}

impl<C: Clock> Scheduler for DeadlineScheduler<C> {
    fn schedule(&mut self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.clock.now().saturating_add(delay.as_nanos() as u64);
        self.pending.push((deadline, id));
        tracing::trace!(timer = id.0, deadline_ns = deadline, "timer scheduled");
        id
    }

    fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|(_, t)| *t != id);
        let cancelled = self.pending.len() != before;
        if cancelled {
            tracing::trace!(timer = id.0, "timer cancelled");
        }
        cancelled
    }

    fn take_due(&mut self) -> Vec<TimerId> {
        let now = self.clock.now();
        let (mut due, rest): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|(deadline, _)| *deadline <= now);
        self.pending = rest;
        due.sort();
        due.into_iter().map(|(_, id)| id).collect()
    }
}
