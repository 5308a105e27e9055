//! The travel control surface: a long-lived UI object shared between the
//! presentation layer and the supervisor.
//!
//! User actions do not call into the supervisor directly. They queue a
//! [`SurfaceIntent`] which the supervisor drains on its next pump, so intents
//! raised while the supervisor is itself closing the surface are handled after
//! the current operation finishes.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::time_scale::AccelerationLadder;

/// Intents emitted by the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceIntent {
    /// The user abandoned the destination.
    Cancel,
    /// The window was dismissed.
    Close,
    /// A new acceleration level was selected.
    AccelerationChanged(usize),
}

/// Batch of intents drained in one pump; rarely more than cancel + close.
pub type IntentBatch = SmallVec<[SurfaceIntent; 4]>;

#[derive(Debug, Clone)]
pub struct TravelControlSurface {
    showing: bool,
    destination: Option<String>,
    ladder: AccelerationLadder,
    level: usize,
    intents: VecDeque<SurfaceIntent>,
}

impl TravelControlSurface {
    #[must_use]
    pub fn new(ladder: AccelerationLadder, starting_level: usize) -> Self {
        let level = ladder.clamp_level(starting_level);
        Self {
            showing: false,
            destination: None,
            ladder,
            level,
            intents: VecDeque::new(),
        }
    }

    #[must_use]
    pub const fn is_showing(&self) -> bool {
        self.showing
    }

    pub fn show(&mut self) {
        self.showing = true;
    }

    /// Dismiss the window as the user would, raising [`SurfaceIntent::Close`].
    pub fn close(&mut self) {
        if self.showing {
            self.showing = false;
            self.intents.push_back(SurfaceIntent::Close);
        }
    }

    /// Cancel the window: raises [`SurfaceIntent::Cancel`] then closes.
    pub fn cancel(&mut self) {
        self.intents.push_back(SurfaceIntent::Cancel);
        self.showing = false;
        self.intents.push_back(SurfaceIntent::Close);
    }

    /// Hide without raising an intent; used when travel pauses itself.
    pub fn withdraw(&mut self) {
        self.showing = false;
    }

    pub fn set_destination(&mut self, name: Option<&str>) {
        self.destination = name.map(str::to_string);
    }

    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    #[must_use]
    pub const fn acceleration_level(&self) -> usize {
        self.level
    }

    /// Multiplier of the selected level.
    #[must_use]
    pub fn acceleration(&self) -> u32 {
        self.ladder.multiplier(self.level)
    }

    #[must_use]
    pub const fn ladder(&self) -> &AccelerationLadder {
        &self.ladder
    }

    /// Select a level, clamped to what the limiter allows.
    pub fn set_acceleration_level(&mut self, level: usize) {
        let clamped = self.ladder.clamp_level(level);
        if clamped != self.level {
            self.level = clamped;
            self.intents
                .push_back(SurfaceIntent::AccelerationChanged(clamped));
        }
    }

    pub fn faster(&mut self) {
        self.set_acceleration_level(self.level.saturating_add(1));
    }

    pub fn slower(&mut self) {
        self.set_acceleration_level(self.level.saturating_sub(1));
    }

    pub fn drain_intents(&mut self) -> IntentBatch {
        self.intents.drain(..).collect()
    }

    #[must_use]
    pub fn has_intents(&self) -> bool {
        !self.intents.is_empty()
    }
}
