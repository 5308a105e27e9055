//! Journey domain primitives shared by the supervisor, policy and hosts.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// Simulation clock reading in whole simulation time units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SimTime(pub u64);

impl SimTime {
    /// Units elapsed since `earlier`, saturating at zero if the clock went backwards.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for SimTime {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0.saturating_add(rhs))
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Map summary a travel request names: region plus map index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapSummary {
    pub region_index: u32,
    pub map_index: u32,
}

impl MapSummary {
    #[must_use]
    pub const fn new(region_index: u32, map_index: u32) -> Self {
        Self {
            region_index,
            map_index,
        }
    }

    /// Identity of the place this summary points at.
    #[must_use]
    pub const fn location_ref(self) -> LocationRef {
        LocationRef {
            region_index: self.region_index,
            map_index: self.map_index,
        }
    }
}

/// Identity of a place in the world, compared by value each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocationRef {
    pub region_index: u32,
    pub map_index: u32,
}

/// A resolved world location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationRef,
    pub name: String,
    /// Human-readable location type ("town", "dungeon", ...).
    pub kind: String,
}

impl Location {
    #[must_use]
    pub fn new(id: LocationRef, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            kind: kind.into(),
        }
    }
}

/// The active travel intent owned by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journey {
    pub destination: MapSummary,
    pub destination_name: String,
    /// Cautious journeys also pause on low health and low fatigue.
    pub cautious: bool,
    pub start_time: SimTime,
    pub last_known_location: Option<LocationRef>,
}

impl Journey {
    #[must_use]
    pub fn new(
        destination: MapSummary,
        name: impl Into<String>,
        cautious: bool,
        start_time: SimTime,
    ) -> Self {
        Self {
            destination,
            destination_name: name.into(),
            cautious,
            start_time,
            last_known_location: None,
        }
    }

    /// Simulation time spent since the journey was first begun.
    #[must_use]
    pub const fn elapsed(&self, now: SimTime) -> u64 {
        now.since(self.start_time)
    }
}

/// Why travel last stopped or paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    #[default]
    None,
    LowHealth,
    LowFatigue,
    NearLocation,
    EnteredLocation,
    EncounterDetected,
    /// Outcome of an avoidance attempt; paused journeys only ever carry `false`.
    EncounterAvoided { succeeded: bool },
    DiseaseOnset,
    UserCancelled,
    UserClosed,
    Arrived,
}

impl PauseReason {
    /// Whether this reason destroys the journey rather than suspending it.
    #[must_use]
    pub const fn clears_journey(self) -> bool {
        matches!(self, Self::UserCancelled | Self::Arrived)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LowHealth => "low_health",
            Self::LowFatigue => "low_fatigue",
            Self::NearLocation => "near_location",
            Self::EnteredLocation => "entered_location",
            Self::EncounterDetected => "encounter_detected",
            Self::EncounterAvoided { succeeded: true } => "encounter_avoided",
            Self::EncounterAvoided { succeeded: false } => "encounter_not_avoided",
            Self::DiseaseOnset => "disease_onset",
            Self::UserCancelled => "user_cancelled",
            Self::UserClosed => "user_closed",
            Self::Arrived => "arrived",
        }
    }
}
