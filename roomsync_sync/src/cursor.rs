use core::time::Duration;
use roomsync_core::interpolate::LerpFn;
use roomsync_core::state::EntityState;
use roomsync_core::time::{Instant, elapsed_between};

/// Whether the rendered state of an observed entity has reached the last received target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationPhase {
    Interpolating,
    AtTarget,
}

/// Observer-side interpolation bookkeeping.
///
/// Every received update restarts the interpolation from wherever the rendered state
/// currently is (`last_visual`) towards the new `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationCursor {
    last_visual: EntityState,
    target: EntityState,
    arrived_at: Instant,
}

impl InterpolationCursor {
    pub fn new(initial: EntityState, now: Instant) -> Self {
        Self {
            last_visual: initial.clone(),
            target: initial,
            arrived_at: now,
        }
    }

    pub fn last_visual(&self) -> &EntityState {
        &self.last_visual
    }

    pub fn target(&self) -> &EntityState {
        &self.target
    }

    pub fn arrived_at(&self) -> Instant {
        self.arrived_at
    }

    /// A new target arrived while the entity was rendered at `visual`
    pub fn retarget(&mut self, visual: EntityState, target: EntityState, now: Instant) {
        self.last_visual = visual;
        self.target = target;
        self.arrived_at = now;
    }

    /// Progress of the interpolation at `now`, clamped to `[0, 1]`
    pub fn progress(&self, now: Instant, window: Duration) -> f64 {
        let elapsed = elapsed_between(self.arrived_at, now);
        if elapsed >= window {
            return 1.0;
        }
        (elapsed.as_secs_f64() / window.as_secs_f64()).min(1.0)
    }

    /// Interpolated state at `now`, along with the progress used to compute it
    pub fn sample(&self, now: Instant, window: Duration, lerp: LerpFn) -> (EntityState, f64) {
        let t = self.progress(now, window);
        (lerp(&self.last_visual, &self.target, t), t)
    }
}
