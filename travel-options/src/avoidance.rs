//! Encounter avoidance negotiation.
//!
//! When enemies are detected mid-journey the agent may try to slip past them.
//! The chance is driven by the better of running and stealth, scaled by a
//! configured cap. The user is asked first; the negotiator itself holds no
//! state between requests, the supervisor keeps the pending request.
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{AVOIDANCE_ROLL_RANGE, IMMUNITY_WINDOW, LOG_TARGET, MSG_AVOID_ATTEMPT};
use crate::journey::SimTime;

/// Skills consulted for the avoidance chance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSkills {
    pub running: u32,
    pub stealth: u32,
}

/// The user's answer to the avoidance prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidanceChoice {
    Attempt,
    Decline,
}

/// Handle identifying one outstanding avoidance prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AvoidanceTicket(pub u64);

/// A prompt issued to the UI layer, answered on a later tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvoidanceRequest {
    pub ticket: AvoidanceTicket,
    /// Integer percent in `0..=100`.
    pub success_chance: u32,
    pub prompt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvoidanceAttemptOutcome {
    pub succeeded: bool,
    /// Encounters are ignored until this time when the attempt succeeded.
    pub immunity_expiry: Option<SimTime>,
}

impl AvoidanceAttemptOutcome {
    #[must_use]
    pub const fn failure() -> Self {
        Self {
            succeeded: false,
            immunity_expiry: None,
        }
    }

    #[must_use]
    pub const fn success(now: SimTime) -> Self {
        Self {
            succeeded: true,
            immunity_expiry: Some(SimTime(now.0.saturating_add(IMMUNITY_WINDOW))),
        }
    }
}

/// `max(running, stealth) * cap / 100`, floored.
#[must_use]
pub fn success_chance(skills: AgentSkills, max_success_chance_percent: u32) -> u32 {
    let best = u64::from(skills.running.max(skills.stealth));
    let chance = best * u64::from(max_success_chance_percent) / 100;
    u32::try_from(chance).unwrap_or(u32::MAX)
}

/// Uniform roll in `[0, 100)` against `chance`.
pub fn success_roll<R: Rng + ?Sized>(chance: u32, rng: &mut R) -> bool {
    rng.gen_range(0..AVOIDANCE_ROLL_RANGE) < chance
}

#[derive(Debug, Clone)]
pub struct EncounterAvoidanceNegotiator {
    max_success_chance_percent: u32,
    next_ticket: u64,
}

impl EncounterAvoidanceNegotiator {
    #[must_use]
    pub const fn new(max_success_chance_percent: u32) -> Self {
        Self {
            max_success_chance_percent,
            next_ticket: 1,
        }
    }

    #[must_use]
    pub const fn max_success_chance_percent(&self) -> u32 {
        self.max_success_chance_percent
    }

    /// Issue a prompt for the given skills.
    pub fn request(&mut self, skills: AgentSkills) -> AvoidanceRequest {
        let ticket = AvoidanceTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);
        AvoidanceRequest {
            ticket,
            success_chance: success_chance(skills, self.max_success_chance_percent),
            prompt: MSG_AVOID_ATTEMPT.to_string(),
        }
    }

    /// Resolve an answered prompt. Declining yields `None` and draws nothing.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        request: &AvoidanceRequest,
        choice: AvoidanceChoice,
        now: SimTime,
        rng: &mut R,
    ) -> Option<AvoidanceAttemptOutcome> {
        match choice {
            AvoidanceChoice::Decline => None,
            AvoidanceChoice::Attempt => {
                let succeeded = success_roll(request.success_chance, rng);
                info!(
                    target: LOG_TARGET,
                    "Avoidance attempt at {}%: {}",
                    request.success_chance,
                    if succeeded { "success" } else { "failure" }
                );
                Some(if succeeded {
                    AvoidanceAttemptOutcome::success(now)
                } else {
                    AvoidanceAttemptOutcome::failure()
                })
            }
        }
    }
}
