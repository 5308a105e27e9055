//! Time acceleration: ladder of allowed multipliers and the controller that
//! applies one to the host's clock and fixed step.
use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::LOG_TARGET;
use crate::host::TimeHost;

/// Ordered multipliers the control surface can step through, capped by a limiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccelerationLadder {
    steps: Vec<u32>,
    limiter: u32,
}

impl AccelerationLadder {
    /// Build a ladder from validated settings; `steps[0]` is expected to be 1.
    #[must_use]
    pub fn new(steps: Vec<u32>, limiter: u32) -> Self {
        Self { steps, limiter }
    }

    #[must_use]
    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    #[must_use]
    pub const fn limiter(&self) -> u32 {
        self.limiter
    }

    /// Multiplier at `level`; levels past the end read as the unit multiplier.
    #[must_use]
    pub fn multiplier(&self, level: usize) -> u32 {
        self.steps.get(level).copied().unwrap_or(1)
    }

    /// Highest level whose multiplier does not exceed the limiter.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.steps
            .iter()
            .rposition(|&step| step <= self.limiter)
            .unwrap_or(0)
    }

    #[must_use]
    pub fn clamp_level(&self, level: usize) -> usize {
        level.min(self.max_level())
    }
}

/// Current acceleration selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeScaleState {
    pub acceleration_level: usize,
    pub multiplier: u32,
    pub limiter_cap: u32,
}

/// Applies acceleration levels to the host clock.
///
/// The fixed step is always derived from the baseline recorded at startup, so
/// any number of scale/unscale cycles lands back on the exact baseline.
#[derive(Debug, Clone)]
pub struct TimeScaleController {
    ladder: AccelerationLadder,
    baseline_fixed_step: f64,
    state: TimeScaleState,
}

impl TimeScaleController {
    #[must_use]
    pub fn new(ladder: AccelerationLadder, baseline_fixed_step: f64) -> Self {
        let state = TimeScaleState {
            acceleration_level: 0,
            multiplier: 1,
            limiter_cap: ladder.limiter(),
        };
        Self {
            ladder,
            baseline_fixed_step,
            state,
        }
    }

    #[must_use]
    pub const fn ladder(&self) -> &AccelerationLadder {
        &self.ladder
    }

    #[must_use]
    pub const fn state(&self) -> TimeScaleState {
        self.state
    }

    #[must_use]
    pub const fn baseline_fixed_step(&self) -> f64 {
        self.baseline_fixed_step
    }

    /// Fixed step that keeps physics consistent at `multiplier`.
    #[must_use]
    pub fn fixed_step_for(&self, multiplier: u32) -> f64 {
        self.baseline_fixed_step * f64::from(multiplier)
    }

    /// Apply the ladder level `level`. Callers clamp; the level is trusted.
    pub fn apply<T: TimeHost + ?Sized>(&mut self, host: &mut T, level: usize) {
        let multiplier = self.ladder.multiplier(level);
        let fixed_step = self.fixed_step_for(multiplier);
        host.set_time_scale(f64::from(multiplier));
        host.set_fixed_step(fixed_step);
        self.state.acceleration_level = level;
        self.state.multiplier = multiplier;
        debug!(target: LOG_TARGET, "Set timescale= {multiplier}, fixedDelta= {fixed_step}");
    }

    /// Return the host to real time.
    pub fn restore_baseline<T: TimeHost + ?Sized>(&mut self, host: &mut T) {
        self.apply(host, 0);
    }
}
