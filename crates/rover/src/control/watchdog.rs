//! Watchdog — retriggerable kill-switch deadline.
//!
//! The watchdog only tracks the deadline; the control loop sleeps until it
//! and calls [`Watchdog::expire`]. Expiry disarms, so silence produces a
//! single stop rather than a stream of them.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Watchdog {
    timeout: Duration,
    deadline: Option<Instant>,
}

impl Watchdog {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, deadline: None }
    }

    /// Restart the countdown from `now`.
    ///
    /// A deadline past the end of the clock leaves the watchdog disarmed
    /// rather than panicking; config validation keeps timeouts well below that.
    pub fn arm_or_retrigger(&mut self, now: Instant) {
        self.deadline = now.checked_add(self.timeout);
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns true exactly once per silence period: when armed and the
    /// deadline has passed. Disarms on expiry.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
