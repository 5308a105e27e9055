//! Error types for travel operations and settings validation.
use thiserror::Error;

use crate::journey::MapSummary;

/// Failures reported by public supervisor operations.
///
/// Per-tick policy checks never fail; every abnormal travel condition is
/// resolved into a pause or an interrupt instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TravelError {
    #[error("destination not found (region {}, map {})", .0.region_index, .0.map_index)]
    DestinationNotFound(MapSummary),
    #[error("no travel destination is set")]
    NoDestination,
    #[error("no encounter avoidance is awaiting a decision")]
    NoPendingAvoidance,
    #[error("avoidance ticket {given} does not match pending ticket {pending}")]
    StaleAvoidanceTicket { given: u64, pending: u64 },
}

/// Errors raised when travel settings invariants are violated.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("acceleration ladder must not be empty")]
    EmptyLadder,
    #[error("acceleration ladder must start at 1 (got {first})")]
    LadderBaseNotUnit { first: u32 },
    #[error("acceleration ladder must be strictly increasing ({previous} then {next})")]
    LadderNotIncreasing { previous: u32, next: u32 },
    #[error("default starting acceleration {index} is outside a ladder of {len} entries")]
    DefaultAccelerationOutOfRange { index: usize, len: usize },
    #[error("acceleration limiter must be at least 1 (got {limiter})")]
    LimiterBelowUnit { limiter: u32 },
    #[error("max chance to avoid encounter must be between 0 and 100 (got {value})")]
    ChanceCapOutOfRange { value: u32 },
    #[error("baseline fixed step must be positive and finite (got {value})")]
    NonPositiveFixedStep { value: f64 },
    #[error("failed to parse travel settings: {0}")]
    Parse(#[from] serde_json::Error),
}
