use crate::time::Instant;
use core::time::Duration;

/// Timer that fires on a fixed period.
///
/// The timer is polled: [`RepeatingTimer::tick`] returns true at most once per call, when
/// the deadline has been reached. If several periods went by since the last call (for
/// example after a stall), the timer fires once and the next deadline is placed after `now`;
/// missed periods are not replayed.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeatingTimer {
    period: Duration,
    next_fire: Instant,
}

impl RepeatingTimer {
    /// Create a timer whose first deadline is one period after `start`
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next_fire: start + period,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next instant at which the timer will fire
    pub fn next_fire(&self) -> Instant {
        self.next_fire
    }

    /// Returns true if the timer fired
    pub fn tick(&mut self, now: Instant) -> bool {
        if now < self.next_fire {
            return false;
        }
        if self.period.is_zero() {
            self.next_fire = now;
            return true;
        }
        while self.next_fire <= now {
            self.next_fire = self.next_fire + self.period;
        }
        true
    }
}
