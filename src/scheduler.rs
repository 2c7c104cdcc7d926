use std::time::{Duration, Instant};

/// Fixed-interval tick scheduler driven by the frame loop.
///
/// Replaces callback timers with an explicit poll: the loop asks `poll(now)`
/// once per frame and steps the simulation when a period has elapsed.
/// `reschedule` re-arms from `now`, replacing (never stacking) the previous
/// schedule, which is what entering or leaving boost requires.
#[derive(Debug, Clone, Copy)]
pub struct TickClock {
    interval: Duration,
    next_due: Option<Instant>,
}

impl TickClock {
    /// Creates a stopped clock with the given period.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    /// Arms the clock: the first tick is due one full period from `now`.
    pub fn start(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        self.next_due = Some(now + interval);
    }

    /// Replaces the running schedule with a new period measured from `now`.
    ///
    /// No-op when the period is unchanged, so calling it every frame with
    /// the current game speed is safe.
    pub fn reschedule(&mut self, interval: Duration, now: Instant) {
        if self.interval == interval {
            return;
        }
        self.interval = interval;
        if self.next_due.is_some() {
            self.next_due = Some(now + interval);
        }
    }

    /// Disarms the clock; `poll` returns false until the next `start`.
    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Returns true at most once per elapsed period.
    ///
    /// The next deadline advances from the previous one (not from `now`) so
    /// a slightly late frame does not accumulate drift, but a long stall
    /// yields one tick, not a burst.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_due = Some(next);
        true
    }

    /// Returns true while the clock is armed.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }
}
