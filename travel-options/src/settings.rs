//! Travel settings, loaded once when the supervisor is constructed.
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

const DEFAULT_SETTINGS_DATA: &str = include_str!("../assets/travel_settings.json");

/// When travel should pause for locations along the route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationPauseMode {
    Off,
    /// Pause each time the current location changes.
    #[default]
    Near,
    /// Pause when the host signals entry into a location's rect.
    Enter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TravelSettings {
    #[serde(default = "TravelSettings::default_cautious_travel")]
    pub cautious_travel: bool,
    #[serde(default)]
    pub location_pause: LocationPauseMode,
    #[serde(default = "TravelSettings::default_starting_acceleration")]
    pub default_starting_acceleration: usize,
    #[serde(default = "TravelSettings::default_acceleration_ladder")]
    pub acceleration_ladder: Vec<u32>,
    #[serde(default = "TravelSettings::default_acceleration_limiter")]
    pub acceleration_limiter: u32,
    #[serde(default = "TravelSettings::default_avoid_random_encounters")]
    pub avoid_random_encounters: bool,
    #[serde(default = "TravelSettings::default_max_chance_to_avoid_encounter")]
    pub max_chance_to_avoid_encounter: u32,
    /// External modules toggled off while travelling and back on afterwards.
    #[serde(default)]
    pub external_toggles: Vec<String>,
    #[serde(default = "TravelSettings::default_baseline_fixed_step")]
    pub baseline_fixed_step: f64,
}

impl TravelSettings {
    const fn default_cautious_travel() -> bool {
        true
    }

    const fn default_starting_acceleration() -> usize {
        2
    }

    fn default_acceleration_ladder() -> Vec<u32> {
        vec![1, 5, 10, 20, 30, 40, 50]
    }

    const fn default_acceleration_limiter() -> u32 {
        50
    }

    const fn default_avoid_random_encounters() -> bool {
        true
    }

    const fn default_max_chance_to_avoid_encounter() -> u32 {
        75
    }

    const fn default_baseline_fixed_step() -> f64 {
        0.02
    }

    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_SETTINGS_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_config() -> Self {
        Self::load_from_static()
    }

    /// Parse settings from JSON; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or the parsed settings fail
    /// validation.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check the invariants the supervisor relies on.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let Some(&first) = self.acceleration_ladder.first() else {
            return Err(SettingsError::EmptyLadder);
        };
        if first != 1 {
            return Err(SettingsError::LadderBaseNotUnit { first });
        }
        if let Some(pair) = self
            .acceleration_ladder
            .windows(2)
            .find(|pair| pair[0] >= pair[1])
        {
            return Err(SettingsError::LadderNotIncreasing {
                previous: pair[0],
                next: pair[1],
            });
        }
        if self.default_starting_acceleration >= self.acceleration_ladder.len() {
            return Err(SettingsError::DefaultAccelerationOutOfRange {
                index: self.default_starting_acceleration,
                len: self.acceleration_ladder.len(),
            });
        }
        if self.acceleration_limiter < 1 {
            return Err(SettingsError::LimiterBelowUnit {
                limiter: self.acceleration_limiter,
            });
        }
        if self.max_chance_to_avoid_encounter > 100 {
            return Err(SettingsError::ChanceCapOutOfRange {
                value: self.max_chance_to_avoid_encounter,
            });
        }
        if !self.baseline_fixed_step.is_finite() || self.baseline_fixed_step <= 0.0 {
            return Err(SettingsError::NonPositiveFixedStep {
                value: self.baseline_fixed_step,
            });
        }
        Ok(())
    }
}

impl Default for TravelSettings {
    fn default() -> Self {
        Self {
            cautious_travel: Self::default_cautious_travel(),
            location_pause: LocationPauseMode::default(),
            default_starting_acceleration: Self::default_starting_acceleration(),
            acceleration_ladder: Self::default_acceleration_ladder(),
            acceleration_limiter: Self::default_acceleration_limiter(),
            avoid_random_encounters: Self::default_avoid_random_encounters(),
            max_chance_to_avoid_encounter: Self::default_max_chance_to_avoid_encounter(),
            external_toggles: Vec::new(),
            baseline_fixed_step: Self::default_baseline_fixed_step(),
        }
    }
}
