//! Deferred deactivation as an absolute deadline checked on every tick.

use std::time::{Duration, Instant};

/// At most one pending deactivation. Arming replaces whatever was pending.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeactivationTimer {
    deadline: Option<Instant>,
}

impl DeactivationTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule expiry `seconds` after `now`, discarding any earlier deadline.
    pub fn arm(&mut self, now: Instant, seconds: u32) {
        let deadline = now
            .checked_add(Duration::from_secs(u64::from(seconds)))
            .unwrap_or_else(|| far_future(now));
        self.deadline = Some(deadline);
    }

    /// Drop the pending deadline without firing it.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True once `now` has reached the deadline. Does not clear it.
    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }

    /// Time left until expiry, zero when due, `None` when idle.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }
}

// Instant has no MAX; a century is "never" for a dosing pump.
fn far_future(now: Instant) -> Instant {
    let mut span = Duration::from_secs(100 * 365 * 24 * 3600);
    loop {
        if let Some(t) = now.checked_add(span) {
            return t;
        }
        span /= 2;
    }
}
