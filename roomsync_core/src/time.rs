/*!
Time primitives.

All the synchronization logic receives the current [`Instant`] explicitly instead of reading
the clock, so a host can drive time by hand (for example a test stepper adding a fixed
frame duration to a base instant).
*/
use core::time::Duration;

pub use std::time::Instant;

/// Time elapsed between `earlier` and `later`, or zero if `later` is before `earlier`
pub fn elapsed_between(earlier: Instant, later: Instant) -> Duration {
    if later > earlier {
        later - earlier
    } else {
        Duration::ZERO
    }
}
