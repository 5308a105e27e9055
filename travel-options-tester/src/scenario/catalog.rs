use anyhow::{Result, ensure};
use travel_options::constants::{
    ARRIVAL_NOTICE_SECONDS, MSG_ARRIVED, MSG_AVOID_FAIL, MSG_ENEMIES, MSG_LOW_FATIGUE,
    MSG_LOW_HEALTH, enter_location_message, near_location_message,
};
use travel_options::{
    AgentSkills, AvoidanceChoice, Location, LocationPauseMode, LocationRef, PauseReason,
    SupervisorState, TravelSettings, WorldChange,
};

use super::TravelScenario;
use crate::logic::{RunSummary, TravelPlan, UserAction};

const GRASS_MODULE: &str = "real-grass";

fn oakhaven() -> Location {
    Location::new(
        LocationRef {
            region_index: 17,
            map_index: 9,
        },
        "Oakhaven",
        "village",
    )
}

fn settings_with(edit: impl FnOnce(&mut TravelSettings)) -> TravelSettings {
    let mut settings = TravelSettings::default_config();
    edit(&mut settings);
    settings
}

pub fn catalog_scenarios() -> Vec<TravelScenario> {
    vec![
        TravelScenario {
            key: "smoke",
            name: "Smoke",
            description: "Uneventful trip to Wayrest arrives and restores the host",
            plan: TravelPlan::new().with_expectation(arrival_expectation),
        },
        TravelScenario {
            key: "cautious-low-health",
            name: "Cautious Low Health",
            description: "Cautious travel pauses when health drops below 5%",
            plan: TravelPlan::new()
                .cautious()
                .at_step(4, WorldChange::SetHealth { current: 2 })
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(summary, PauseReason::LowHealth, MSG_LOW_HEALTH)
                }),
        },
        TravelScenario {
            key: "careless-low-health",
            name: "Careless Low Health",
            description: "Non-cautious travel ignores health and fatigue",
            plan: TravelPlan::new()
                .at_step(2, WorldChange::SetHealth { current: 1 })
                .at_step(3, WorldChange::SetFatigue { fatigue: 0 })
                .with_expectation(arrival_expectation),
        },
        TravelScenario {
            key: "exhausted",
            name: "Exhausted",
            description: "Cautious travel pauses when fatigue runs low",
            plan: TravelPlan::new()
                .cautious()
                .at_step(3, WorldChange::SetFatigue { fatigue: 10 })
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(summary, PauseReason::LowFatigue, MSG_LOW_FATIGUE)
                }),
        },
        TravelScenario {
            key: "near-location",
            name: "Near Location",
            description: "Passing close to a village pauses in near mode",
            plan: TravelPlan::new()
                .at_step(5, WorldChange::Approach { location: oakhaven() })
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(
                        summary,
                        PauseReason::NearLocation,
                        &near_location_message("village", "Oakhaven"),
                    )
                }),
        },
        TravelScenario {
            key: "enter-location",
            name: "Enter Location",
            description: "Entering a village pauses in enter mode",
            plan: TravelPlan::new()
                .with_settings(settings_with(|settings| {
                    settings.location_pause = LocationPauseMode::Enter;
                }))
                .at_step(5, WorldChange::Enter { location: oakhaven() })
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(
                        summary,
                        PauseReason::EnteredLocation,
                        &enter_location_message("village", "Oakhaven"),
                    )
                }),
        },
        TravelScenario {
            key: "encounter-paused",
            name: "Encounter Paused",
            description: "Enemies pause travel when avoidance is disabled",
            plan: TravelPlan::new()
                .with_settings(settings_with(|settings| {
                    settings.avoid_random_encounters = false;
                }))
                .at_step(3, WorldChange::SetEnemies { nearby: true })
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(summary, PauseReason::EncounterDetected, MSG_ENEMIES)?;
                    ensure!(
                        summary.record.avoidance_prompts.is_empty(),
                        "avoidance prompt shown while avoidance is disabled"
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "encounter-avoidance",
            name: "Encounter Avoidance",
            description: "Attempting to avoid enemies either slips past or pauses",
            plan: TravelPlan::new()
                .with_skills(AgentSkills {
                    running: 80,
                    stealth: 35,
                })
                .at_step(3, WorldChange::SetEnemies { nearby: true })
                .answering(AvoidanceChoice::Attempt)
                .with_expectation(avoidance_expectation),
        },
        TravelScenario {
            key: "encounter-declined",
            name: "Encounter Declined",
            description: "Declining the avoidance prompt pauses without a roll",
            plan: TravelPlan::new()
                .with_skills(AgentSkills {
                    running: 90,
                    stealth: 0,
                })
                .at_step(3, WorldChange::SetEnemies { nearby: true })
                .answering(AvoidanceChoice::Decline)
                .with_expectation(|summary: &RunSummary| {
                    ensure!(
                        summary.state
                            == SupervisorState::Paused {
                                reason: PauseReason::EncounterDetected
                            },
                        "expected an encounter pause"
                    );
                    ensure!(summary.rng_draws == 0, "declining drew from the rng");
                    ensure!(
                        summary.record.message_boxes.is_empty(),
                        "declining showed a notice"
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "global-encounter",
            name: "Global Encounter",
            description: "The world's encounter signal pauses travel",
            plan: TravelPlan::new()
                .at_step(4, WorldChange::EncounterSignal)
                .with_expectation(|summary: &RunSummary| {
                    expect_paused(summary, PauseReason::EncounterDetected, MSG_ENEMIES)
                }),
        },
        TravelScenario {
            key: "disease-onset",
            name: "Disease Onset",
            description: "A new disease interrupts travel but keeps the destination",
            plan: TravelPlan::new()
                .at_step(4, WorldChange::ContractDisease)
                .with_expectation(|summary: &RunSummary| {
                    ensure!(summary.state == SupervisorState::Idle, "travel not stopped");
                    ensure!(
                        summary.last_reason == PauseReason::DiseaseOnset,
                        "unexpected reason {}",
                        summary.last_reason.key()
                    );
                    ensure!(summary.destination_retained, "destination was cleared");
                    ensure!(
                        summary.record.health_status_shown == 1,
                        "health status shown {} times",
                        summary.record.health_status_shown
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "user-cancel",
            name: "User Cancel",
            description: "Cancelling from the control surface clears the destination",
            plan: TravelPlan::new()
                .before_tick(4, UserAction::Cancel)
                .with_expectation(|summary: &RunSummary| {
                    expect_stopped(summary, PauseReason::UserCancelled, false)
                }),
        },
        TravelScenario {
            key: "user-close",
            name: "User Close",
            description: "Closing the control surface stops travel and keeps the destination",
            plan: TravelPlan::new()
                .before_tick(4, UserAction::Close)
                .with_expectation(|summary: &RunSummary| {
                    expect_stopped(summary, PauseReason::UserClosed, true)
                }),
        },
        TravelScenario {
            key: "interrupt",
            name: "Interrupt",
            description: "Interrupting travel stops the autopilot and keeps the destination",
            plan: TravelPlan::new()
                .before_tick(3, UserAction::Interrupt)
                .with_expectation(|summary: &RunSummary| {
                    expect_stopped(summary, PauseReason::None, true)?;
                    ensure!(
                        summary.record.input_restores == 1,
                        "input restored {} times",
                        summary.record.input_restores
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "acceleration",
            name: "Acceleration",
            description: "Raising the acceleration mid-journey rescales the host clock",
            plan: TravelPlan::new()
                .before_tick(2, UserAction::Faster)
                .before_tick(3, UserAction::Faster)
                .before_tick(5, UserAction::Slower)
                .with_expectation(|summary: &RunSummary| {
                    arrival_expectation(summary)?;
                    let scales = &summary.record.time_scales;
                    ensure!(
                        scales.starts_with(&[10.0, 20.0, 30.0, 20.0]),
                        "unexpected time scale history {scales:?}"
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "external-toggles",
            name: "External Toggles",
            description: "External modules are toggled off for the trip and back on after",
            plan: TravelPlan::new()
                .with_settings(settings_with(|settings| {
                    settings.external_toggles = vec![GRASS_MODULE.to_string()];
                }))
                .with_expectation(|summary: &RunSummary| {
                    arrival_expectation(summary)?;
                    let values: Vec<bool> = summary
                        .record
                        .module_messages
                        .iter()
                        .filter(|message| message.module == GRASS_MODULE)
                        .map(|message| message.value)
                        .collect();
                    ensure!(
                        values == [false, true],
                        "unexpected toggle sequence {values:?}"
                    );
                    Ok(())
                }),
        },
        TravelScenario {
            key: "deterministic",
            name: "Deterministic Replay",
            description: "The same seed replays the same journey",
            plan: TravelPlan::new()
                .with_route_steps(40)
                .with_skills(AgentSkills {
                    running: 50,
                    stealth: 60,
                })
                .at_step(2, WorldChange::SetEnemies { nearby: true })
                .with_replay_check()
                .with_expectation(|summary: &RunSummary| {
                    ensure!(
                        summary.replay_digest == Some(summary.digest),
                        "replay digest {:?} differs from {:#x}",
                        summary.replay_digest,
                        summary.digest
                    );
                    Ok(())
                }),
        },
    ]
}

fn arrival_expectation(summary: &RunSummary) -> Result<()> {
    ensure!(summary.arrived(), "journey never arrived");
    ensure!(
        summary.last_reason == PauseReason::Arrived,
        "last reason {} after arrival",
        summary.last_reason.key()
    );
    ensure!(!summary.destination_retained, "destination kept after arrival");
    ensure!(
        summary.record.mid_screen == [(MSG_ARRIVED.to_string(), ARRIVAL_NOTICE_SECONDS)],
        "arrival notice missing: {:?}",
        summary.record.mid_screen
    );
    ensure!(
        summary.record.vitals_refreshes == summary.ticks,
        "vitals refreshed {} times over {} ticks",
        summary.record.vitals_refreshes,
        summary.ticks
    );
    Ok(())
}

fn expect_paused(summary: &RunSummary, reason: PauseReason, message: &str) -> Result<()> {
    ensure!(
        summary.state == SupervisorState::Paused { reason },
        "expected pause {}, got {:?}",
        reason.key(),
        summary.state
    );
    ensure!(summary.destination_retained, "paused journey lost its destination");
    ensure!(
        summary.record.message_boxes.last().map(String::as_str) == Some(message),
        "expected notice {message:?}, got {:?}",
        summary.record.message_boxes
    );
    Ok(())
}

fn expect_stopped(summary: &RunSummary, reason: PauseReason, retained: bool) -> Result<()> {
    ensure!(summary.state == SupervisorState::Idle, "travel not stopped");
    ensure!(
        summary.last_reason == reason,
        "expected {}, got {}",
        reason.key(),
        summary.last_reason.key()
    );
    ensure!(
        summary.destination_retained == retained,
        "destination retained: {}",
        summary.destination_retained
    );
    Ok(())
}

fn avoidance_expectation(summary: &RunSummary) -> Result<()> {
    let results = summary.avoidance_results();
    ensure!(summary.negotiations >= 1, "enemies never triggered a prompt");
    ensure!(
        results.len() == usize::try_from(summary.negotiations).unwrap_or(usize::MAX),
        "{} prompts but {} resolutions",
        summary.negotiations,
        results.len()
    );
    ensure!(
        summary.rng_draws >= u64::from(summary.negotiations),
        "fewer draws than attempts"
    );
    match results.last() {
        Some(false) => {
            expect_paused(
                summary,
                PauseReason::EncounterAvoided { succeeded: false },
                MSG_AVOID_FAIL,
            )?;
        }
        _ => arrival_expectation(summary)?,
    }
    Ok(())
}
