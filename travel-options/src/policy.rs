//! Ordered pause rules evaluated once per travelling tick.
//!
//! Rules are checked in declaration order and the first match wins; lower
//! priority causes wait for a later tick.
use crate::constants::{LOW_FATIGUE_UNITS, LOW_HEALTH_FRACTION};
use crate::journey::{LocationRef, PauseReason};
use crate::settings::LocationPauseMode;

/// World readings the rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSnapshot {
    pub cautious: bool,
    pub health_fraction: f32,
    pub fatigue: i32,
    pub fatigue_unit: i32,
    pub location_pause: LocationPauseMode,
    pub current_location: Option<LocationRef>,
    pub last_known_location: Option<LocationRef>,
    pub enemies_nearby: bool,
    /// An avoided encounter is still keeping enemies away.
    pub immune: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct PauseRule {
    pub reason: PauseReason,
    pub applies: fn(&TickSnapshot) -> bool,
}

fn low_health(snapshot: &TickSnapshot) -> bool {
    snapshot.cautious && snapshot.health_fraction < LOW_HEALTH_FRACTION
}

fn low_fatigue(snapshot: &TickSnapshot) -> bool {
    snapshot.cautious
        && snapshot.fatigue < snapshot.fatigue_unit.saturating_mul(LOW_FATIGUE_UNITS)
}

fn near_location(snapshot: &TickSnapshot) -> bool {
    snapshot.location_pause == LocationPauseMode::Near
        && snapshot.current_location.is_some()
        && snapshot.current_location != snapshot.last_known_location
}

fn encounter(snapshot: &TickSnapshot) -> bool {
    !snapshot.immune && snapshot.enemies_nearby
}

pub const PAUSE_RULES: [PauseRule; 4] = [
    PauseRule {
        reason: PauseReason::LowHealth,
        applies: low_health,
    },
    PauseRule {
        reason: PauseReason::LowFatigue,
        applies: low_fatigue,
    },
    PauseRule {
        reason: PauseReason::NearLocation,
        applies: near_location,
    },
    PauseRule {
        reason: PauseReason::EncounterDetected,
        applies: encounter,
    },
];

/// First rule that applies, if any.
#[must_use]
pub fn first_pause(snapshot: &TickSnapshot) -> Option<PauseReason> {
    PAUSE_RULES
        .iter()
        .find(|rule| (rule.applies)(snapshot))
        .map(|rule| rule.reason)
}
