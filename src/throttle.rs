//! Latest-wins throttle for fast-changing values.
//!
//! DESIGN
//! ======
//! Trailing-edge: the first value observed after an emission arms a deadline
//! one interval out; values arriving before the deadline overwrite the
//! pending slot. At the deadline the most recent value is emitted once and the
//! throttle goes idle until the next input. It is reactive, not a ticker: with
//! no input nothing is ever emitted.
//!
//! Time is always passed in by the caller so the state machine stays pure;
//! the session driver feeds it `tokio::time::Instant::now()` and sleeps until
//! [`Throttle::deadline`].

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
pub struct Throttle<T> {
    interval: Duration,
    pending: Option<T>,
    deadline: Option<Instant>,
}

impl<T> Throttle<T> {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval, pending: None, deadline: None }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record a new value. Replaces any value still waiting for the deadline.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some(value);
        if self.deadline.is_none() {
            self.deadline = Some(now + self.interval);
        }
    }

    /// When the pending value becomes due, if one is waiting.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline?;
        if now < deadline {
            return None;
        }
        self.deadline = None;
        self.pending.take()
    }

    /// Take the pending value without waiting for its deadline.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }

    /// Drop any pending value and disarm the deadline.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.deadline = None;
    }
}
