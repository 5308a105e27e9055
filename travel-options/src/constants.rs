//! Centralized thresholds, notice texts and log keys for travel supervision.
//!
//! The pause thresholds and the immunity window are part of the travel
//! rules, not user settings; changing them is a code change.

// Notice texts -------------------------------------------------------------
pub const MSG_ARRIVED: &str = "You have arrived at your destination.";
pub const MSG_ENEMIES: &str = "Enemies are seeking to prevent your travel...";
pub const MSG_AVOID_ATTEMPT: &str = "You suspect enemies are close, attempt to avoid them?";
pub const MSG_AVOID_FAIL: &str = "You failed to avoid the encounter!";
pub const MSG_LOW_HEALTH: &str = "You are close to the point of death!";
pub const MSG_LOW_FATIGUE: &str = "You are exhausted and should rest.";

/// Seconds the arrival notice stays on screen.
pub const ARRIVAL_NOTICE_SECONDS: f32 = 5.0;

// Pause thresholds ---------------------------------------------------------
/// Cautious travel pauses when health drops below this fraction of maximum.
pub const LOW_HEALTH_FRACTION: f32 = 0.05;
/// Cautious travel pauses when fatigue drops below this many fatigue units.
pub const LOW_FATIGUE_UNITS: i32 = 6;

// Encounter avoidance ------------------------------------------------------
/// Simulation time units an avoided encounter keeps further encounters away.
pub const IMMUNITY_WINDOW: u64 = 10;
/// Exclusive upper bound of the avoidance roll.
pub const AVOIDANCE_ROLL_RANGE: u32 = 100;

// Ambient systems ----------------------------------------------------------
/// Message sent to external modules listed in the toggle settings.
pub const EXTERNAL_TOGGLE_MESSAGE: &str = "toggle";

// Journal ------------------------------------------------------------------
/// Number of travel events retained before the oldest are dropped.
pub const EVENT_JOURNAL_CAPACITY: usize = 256;

// Log keys -----------------------------------------------------------------
pub(crate) const LOG_TARGET: &str = "travel_options";
pub(crate) const RNG_DOMAIN_AVOIDANCE: &[u8] = b"avoidance";

/// Near-location pause notice.
#[must_use]
pub fn near_location_message(kind: &str, name: &str) -> String {
    format!("Paused the journey since a {kind} called {name} is nearby.")
}

/// Entered-location pause notice.
#[must_use]
pub fn enter_location_message(kind: &str, name: &str) -> String {
    format!("Paused the journey as you've entered a {kind} called {name}.")
}
