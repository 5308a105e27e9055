use std::cell::RefCell;
use std::rc::Rc;

use travel_options::constants::{
    MSG_ARRIVED, MSG_AVOID_FAIL, MSG_ENEMIES, MSG_LOW_FATIGUE, MSG_LOW_HEALTH,
    enter_location_message, near_location_message,
};
use travel_options::{
    AgentSkills, AvoidanceChoice, HeadlessWorld, JourneySupervisor, Location, LocationRef,
    MapSummary, PauseReason, SignalBus, SimTime, SupervisorState, TravelError, TravelEvent,
    TravelSettings, WorldChange, WorldSignal,
};

fn wayrest() -> MapSummary {
    MapSummary::new(17, 4)
}

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

fn world(route_steps: u32) -> HeadlessWorld {
    HeadlessWorld::new()
        .with_destination(wayrest(), "Wayrest", "city")
        .with_route_steps(route_steps)
}

fn supervise(
    mut world: HeadlessWorld,
    settings: TravelSettings,
) -> JourneySupervisor<HeadlessWorld> {
    let bus = Rc::new(RefCell::new(SignalBus::new()));
    world.attach_bus(Rc::clone(&bus));
    JourneySupervisor::with_bus(world, settings, 0x5EED, bus).unwrap()
}

fn settings(json: &str) -> TravelSettings {
    TravelSettings::from_json(json).unwrap()
}

fn tick_n(supervisor: &mut JourneySupervisor<HeadlessWorld>, ticks: u32) {
    for _ in 0..ticks {
        supervisor.tick();
    }
}

#[test]
fn wayrest_trip_arrives_and_restores_the_host() {
    let mut supervisor = supervise(world(5), TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    assert_eq!(supervisor.state(), SupervisorState::Travelling);
    assert_eq!(supervisor.destination_name(), Some("Wayrest"));
    assert!((supervisor.host().time_scale() - 10.0).abs() < f64::EPSILON);
    assert!((supervisor.host().fixed_step() - 0.2).abs() < 1e-12);
    assert!(!supervisor.host().ambient().footsteps);
    assert!(!supervisor.host().ambient().precipitation_particles);

    tick_n(&mut supervisor, 5);

    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(supervisor.journey().is_none());
    assert!(!supervisor.autopilot_active());
    assert_eq!(supervisor.last_reason(), PauseReason::Arrived);

    let host = supervisor.host();
    assert!((host.time_scale() - 1.0).abs() < f64::EPSILON);
    assert_eq!(host.fixed_step().to_bits(), 0.02_f64.to_bits());
    assert_eq!(host.record().mid_screen, vec![(MSG_ARRIVED.to_string(), 5.0)]);
    assert_eq!(host.record().input_restores, 1);
    assert_eq!(host.record().vitals_refreshes, 5);
    assert!(host.ambient().player_weather);
    assert!(host.ambient().footsteps);
    assert!(host.ambient().transport_audio);
    assert!(!host.ambient().precipitation_particles);
    assert!(host.record().message_boxes.is_empty());

    assert!(supervisor.events().any(|event| matches!(
        event,
        TravelEvent::Arrived { destination, elapsed: 50 } if destination == "Wayrest"
    )));
    assert!(!supervisor.surface().borrow().is_showing());
}

#[test]
fn cautious_trip_pauses_on_low_health_and_keeps_the_autopilot() {
    let mut world = world(10);
    world.schedule(2, WorldChange::SetHealth { current: 3 });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();

    tick_n(&mut supervisor, 2);

    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::LowHealth
        }
    );
    assert!(supervisor.autopilot_active());
    assert!(supervisor.journey().is_some());
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_LOW_HEALTH]);
    assert!((supervisor.host().time_scale() - 1.0).abs() < f64::EPSILON);

    // Paused journeys do not advance.
    let steps = supervisor.host().steps_taken();
    tick_n(&mut supervisor, 3);
    assert_eq!(supervisor.host().steps_taken(), steps);
}

#[test]
fn careless_trip_ignores_health_and_fatigue() {
    let mut world = world(6);
    world.schedule(1, WorldChange::SetHealth { current: 1 });
    world.schedule(1, WorldChange::SetFatigue { fatigue: 0 });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 6);

    assert_eq!(supervisor.last_reason(), PauseReason::Arrived);
    assert!(supervisor.host().record().message_boxes.is_empty());
}

#[test]
fn low_health_outranks_low_fatigue() {
    let mut world = world(10);
    world.schedule(1, WorldChange::SetHealth { current: 2 });
    world.schedule(1, WorldChange::SetFatigue { fatigue: 10 });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();

    supervisor.tick();

    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::LowHealth
        }
    );
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_LOW_HEALTH]);
}

#[test]
fn exhaustion_pauses_cautious_travel() {
    let mut world = world(10);
    world.schedule(3, WorldChange::SetFatigue { fatigue: 64 * 6 - 1 });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();

    tick_n(&mut supervisor, 3);

    assert_eq!(supervisor.last_reason(), PauseReason::LowFatigue);
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_LOW_FATIGUE]);
}

#[test]
fn defaults_supply_the_cautious_flag() {
    let mut supervisor = supervise(world(10), settings(r#"{"cautious_travel": false}"#));
    supervisor.begin_travel_with_defaults(wayrest()).unwrap();
    assert!(!supervisor.journey().unwrap().cautious);
}

#[test]
fn unresolvable_destination_changes_nothing() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    let missing = MapSummary::new(99, 99);

    assert_eq!(
        supervisor.begin_travel(missing, true),
        Err(TravelError::DestinationNotFound(missing))
    );
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(supervisor.journey().is_none());
    assert_eq!(supervisor.host().record().autopilots_spawned, 0);
    assert!(supervisor.host().record().time_scales.is_empty());

    supervisor.begin_travel(wayrest(), true).unwrap();
    supervisor.tick();
    assert!(supervisor.begin_travel(missing, false).is_err());
    assert_eq!(supervisor.state(), SupervisorState::Travelling);
    assert_eq!(supervisor.destination_name(), Some("Wayrest"));
    assert!(supervisor.journey().unwrap().cautious);
}

#[test]
fn second_begin_supersedes_the_first() {
    let mut world = world(10);
    world.add_destination(MapSummary::new(3, 1), "Daggerfall", "city");
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();
    supervisor.begin_travel(MapSummary::new(3, 1), false).unwrap();

    assert_eq!(supervisor.destination_name(), Some("Daggerfall"));
    assert_eq!(supervisor.host().record().autopilots_spawned, 2);
    assert_eq!(supervisor.host().record().look_at_destination, 1);
    assert_eq!(
        supervisor.surface().borrow().destination(),
        Some("Daggerfall")
    );
}

#[test]
fn interrupt_twice_restores_once() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();
    supervisor.tick();

    supervisor.interrupt_travel();
    supervisor.interrupt_travel();

    let record = supervisor.host().record();
    assert_eq!(record.input_restores, 1);
    assert_eq!(record.look_at_destination, 1);
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert_eq!(supervisor.destination_name(), Some("Wayrest"));

    let interrupts = supervisor
        .events()
        .filter(|event| matches!(event, TravelEvent::Interrupted { .. }))
        .count();
    assert_eq!(interrupts, 1);
}

#[test]
fn resume_without_destination_fails() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    assert_eq!(supervisor.resume_travel(), Err(TravelError::NoDestination));
    supervisor.interrupt_travel();
    assert_eq!(supervisor.host().record().input_restores, 0);
}

#[test]
fn interrupted_trip_resumes_where_it_left_off() {
    let mut supervisor = supervise(world(6), TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    tick_n(&mut supervisor, 4);
    supervisor.interrupt_travel();
    tick_n(&mut supervisor, 3);
    assert_eq!(supervisor.host().steps_taken(), 4);

    supervisor.resume_travel().unwrap();
    tick_n(&mut supervisor, 2);

    assert_eq!(supervisor.last_reason(), PauseReason::Arrived);
    assert_eq!(supervisor.host().record().autopilots_spawned, 2);
}

#[test]
fn near_location_pauses_once_per_location() {
    let mut world = world(10);
    world.schedule(2, WorldChange::Approach { location: oakhaven() });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 2);
    assert_eq!(supervisor.last_reason(), PauseReason::NearLocation);
    assert_eq!(
        supervisor.host().record().message_boxes,
        vec![near_location_message("village", "Oakhaven")]
    );

    supervisor.resume_travel().unwrap();
    tick_n(&mut supervisor, 3);
    assert_eq!(supervisor.state(), SupervisorState::Travelling);
    assert_eq!(supervisor.host().record().message_boxes.len(), 1);
}

#[test]
fn entering_a_location_pauses_in_enter_mode() {
    let mut world = world(10);
    world.schedule(2, WorldChange::Enter { location: oakhaven() });
    let mut supervisor = supervise(world, settings(r#"{"location_pause": "enter"}"#));
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 2);
    supervisor.pump();

    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::EnteredLocation
        }
    );
    assert_eq!(
        supervisor.host().record().message_boxes,
        vec![enter_location_message("village", "Oakhaven")]
    );
}

#[test]
fn location_mode_off_never_pauses_for_places() {
    let mut world = world(6);
    world.schedule(1, WorldChange::Approach { location: oakhaven() });
    world.schedule(2, WorldChange::Enter { location: oakhaven() });
    let mut supervisor = supervise(world, settings(r#"{"location_pause": "off"}"#));
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 6);

    assert_eq!(supervisor.last_reason(), PauseReason::Arrived);
    assert!(supervisor.host().record().message_boxes.is_empty());
}

#[test]
fn enemies_pause_when_avoidance_is_disabled() {
    let mut world = world(10);
    world.schedule(2, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(world, settings(r#"{"avoid_random_encounters": false}"#));
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 2);

    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::EncounterDetected
        }
    );
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_ENEMIES]);
    assert!(supervisor.host().record().avoidance_prompts.is_empty());
}

#[test]
fn declining_avoidance_pauses_without_rolling() {
    let mut world = world(10).with_skills(AgentSkills {
        running: 90,
        stealth: 10,
    });
    world.schedule(2, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    tick_n(&mut supervisor, 2);

    let SupervisorState::Negotiating { ticket } = supervisor.state() else {
        panic!("expected negotiation, got {:?}", supervisor.state());
    };
    assert_eq!(supervisor.pending_avoidance().unwrap().success_chance, 67);
    assert_eq!(supervisor.host().record().avoidance_prompts.len(), 1);

    let outcome = supervisor
        .resolve_avoidance(ticket, AvoidanceChoice::Decline)
        .unwrap();
    assert!(outcome.is_none());
    assert_eq!(supervisor.rng_draws(), 0);
    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::EncounterDetected
        }
    );
    assert!(supervisor.host().record().message_boxes.is_empty());
    assert_eq!(
        supervisor.resolve_avoidance(ticket, AvoidanceChoice::Attempt),
        Err(TravelError::NoPendingAvoidance)
    );
}

#[test]
fn failed_avoidance_shows_notice_and_stays_paused() {
    let mut world = world(10);
    world.schedule(1, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    supervisor.tick();

    let SupervisorState::Negotiating { ticket } = supervisor.state() else {
        panic!("expected negotiation");
    };
    let outcome = supervisor
        .resolve_avoidance(ticket, AvoidanceChoice::Attempt)
        .unwrap()
        .unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(supervisor.immunity_expiry(), None);
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_AVOID_FAIL]);
    assert_eq!(
        supervisor.last_reason(),
        PauseReason::EncounterAvoided { succeeded: false }
    );
    assert!(supervisor.autopilot_active());
}

#[test]
fn stale_ticket_is_rejected() {
    let mut world = world(10);
    world.schedule(1, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    supervisor.tick();

    let SupervisorState::Negotiating { ticket } = supervisor.state() else {
        panic!("expected negotiation");
    };
    let stale = travel_options::AvoidanceTicket(ticket.0 + 7);
    assert!(matches!(
        supervisor.resolve_avoidance(stale, AvoidanceChoice::Attempt),
        Err(TravelError::StaleAvoidanceTicket { .. })
    ));
    assert!(supervisor.pending_avoidance().is_some());
}

#[test]
fn successful_avoidance_grants_a_ten_unit_window() {
    let mut world = world(40).with_skills(AgentSkills {
        running: 100,
        stealth: 0,
    });
    world.schedule(2, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(
        world,
        settings(r#"{"max_chance_to_avoid_encounter": 100, "default_starting_acceleration": 0}"#),
    );
    supervisor.begin_travel(wayrest(), false).unwrap();
    tick_n(&mut supervisor, 2);

    let SupervisorState::Negotiating { ticket } = supervisor.state() else {
        panic!("expected negotiation");
    };
    let outcome = supervisor
        .resolve_avoidance(ticket, AvoidanceChoice::Attempt)
        .unwrap()
        .unwrap();
    assert!(outcome.succeeded);
    assert_eq!(outcome.immunity_expiry.map(|time| time.0), Some(12));
    assert_eq!(supervisor.state(), SupervisorState::Travelling);

    // Clock reads 3..=11 over the next nine ticks: enemies are ignored.
    tick_n(&mut supervisor, 9);
    assert_eq!(supervisor.host().record().avoidance_prompts.len(), 1);
    assert_eq!(supervisor.state(), SupervisorState::Travelling);

    // At exactly now + 10 the window has closed.
    supervisor.tick();
    assert!(matches!(
        supervisor.state(),
        SupervisorState::Negotiating { .. }
    ));
    assert_eq!(supervisor.host().record().avoidance_prompts.len(), 2);
}

#[test]
fn immunity_window_also_masks_the_encounter_signal() {
    let mut world = world(40).with_skills(AgentSkills {
        running: 100,
        stealth: 0,
    });
    world.schedule(2, WorldChange::SetEnemies { nearby: true });
    let mut supervisor = supervise(
        world,
        settings(r#"{"max_chance_to_avoid_encounter": 100, "default_starting_acceleration": 0}"#),
    );
    supervisor.begin_travel(wayrest(), false).unwrap();
    tick_n(&mut supervisor, 2);

    let SupervisorState::Negotiating { ticket } = supervisor.state() else {
        panic!("expected negotiation");
    };
    supervisor
        .resolve_avoidance(ticket, AvoidanceChoice::Attempt)
        .unwrap();
    assert_eq!(supervisor.immunity_expiry(), Some(SimTime(12)));
    supervisor.with_host_mut(|world| {
        world.apply(WorldChange::SetEnemies { nearby: false });
        world.advance_clock(9);
    });

    // One unit before expiry the signal is ignored.
    supervisor
        .signal_bus()
        .borrow_mut()
        .publish(WorldSignal::Encounter);
    supervisor.pump();
    assert_eq!(supervisor.state(), SupervisorState::Travelling);
    assert!(supervisor.events().any(|event| matches!(
        event,
        TravelEvent::EncounterIgnored { until } if *until == SimTime(12)
    )));
    assert!(supervisor.host().record().message_boxes.is_empty());

    // At expiry it is honoured.
    supervisor.with_host_mut(|world| world.advance_clock(1));
    supervisor
        .signal_bus()
        .borrow_mut()
        .publish(WorldSignal::Encounter);
    supervisor.pump();
    assert_eq!(
        supervisor.state(),
        SupervisorState::Paused {
            reason: PauseReason::EncounterDetected
        }
    );
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_ENEMIES]);
    assert_eq!(supervisor.immunity_expiry(), None);
}

#[test]
fn signal_on_the_final_step_does_not_preempt_arrival() {
    let mut world = world(5);
    world.schedule(5, WorldChange::EncounterSignal);
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 5);
    assert_eq!(supervisor.last_reason(), PauseReason::Arrived);
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(supervisor.host().record().message_boxes.is_empty());

    // The leftover signal finds nothing travelling.
    supervisor.tick();
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(supervisor.host().record().message_boxes.is_empty());
    assert_eq!(
        supervisor.host().record().mid_screen,
        vec![(MSG_ARRIVED.to_string(), 5.0)]
    );
}

#[test]
fn global_encounter_signal_pauses_travel() {
    let mut world = world(10);
    world.schedule(2, WorldChange::EncounterSignal);
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 3);

    assert_eq!(supervisor.last_reason(), PauseReason::EncounterDetected);
    assert_eq!(supervisor.host().record().message_boxes, vec![MSG_ENEMIES]);
    assert!((supervisor.host().time_scale() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn encounter_signal_is_ignored_when_not_travelling() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    supervisor
        .signal_bus()
        .borrow_mut()
        .publish(WorldSignal::Encounter);
    supervisor.tick();
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert!(supervisor.host().record().message_boxes.is_empty());
}

#[test]
fn disease_onset_interrupts_but_keeps_destination() {
    let mut world = world(10);
    world.schedule(3, WorldChange::ContractDisease);
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 3);

    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert_eq!(supervisor.last_reason(), PauseReason::DiseaseOnset);
    assert_eq!(supervisor.destination_name(), Some("Wayrest"));
    assert!(!supervisor.autopilot_active());
    assert_eq!(supervisor.host().record().health_status_shown, 1);

    supervisor.resume_travel().unwrap();
    supervisor.tick();
    assert_eq!(supervisor.state(), SupervisorState::Travelling);
}

#[test]
fn cured_disease_resnapshots_silently() {
    let mut world = world(10);
    world.apply(WorldChange::ContractDisease);
    world.schedule(2, WorldChange::CureDisease);
    world.schedule(4, WorldChange::ContractDisease);
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();

    tick_n(&mut supervisor, 3);
    assert_eq!(supervisor.state(), SupervisorState::Travelling);

    supervisor.tick();
    assert_eq!(supervisor.last_reason(), PauseReason::DiseaseOnset);
}

#[test]
fn cancel_clears_and_close_retains_destination() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    supervisor.tick();

    supervisor.surface().borrow_mut().close();
    supervisor.tick();
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert_eq!(supervisor.last_reason(), PauseReason::UserClosed);
    assert_eq!(supervisor.destination_name(), Some("Wayrest"));

    supervisor.resume_travel().unwrap();
    supervisor.tick();
    supervisor.surface().borrow_mut().cancel();
    supervisor.tick();
    assert_eq!(supervisor.state(), SupervisorState::Idle);
    assert_eq!(supervisor.last_reason(), PauseReason::UserCancelled);
    assert!(supervisor.journey().is_none());
    assert_eq!(supervisor.surface().borrow().destination(), None);
}

#[test]
fn acceleration_changes_apply_only_while_travelling() {
    let mut world = world(20);
    world.schedule(2, WorldChange::SetHealth { current: 1 });
    let mut supervisor = supervise(world, TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), true).unwrap();

    supervisor.surface().borrow_mut().faster();
    supervisor.tick();
    assert!((supervisor.host().time_scale() - 20.0).abs() < f64::EPSILON);
    assert_eq!(supervisor.time_scale_state().acceleration_level, 3);

    supervisor.tick();
    assert_eq!(supervisor.last_reason(), PauseReason::LowHealth);

    supervisor.surface().borrow_mut().faster();
    supervisor.pump();
    assert!((supervisor.host().time_scale() - 1.0).abs() < f64::EPSILON);

    supervisor
        .with_host_mut(|world| world.apply(WorldChange::SetHealth { current: 80 }));
    supervisor.resume_travel().unwrap();
    assert!((supervisor.host().time_scale() - 30.0).abs() < f64::EPSILON);
}

#[test]
fn limiter_caps_the_selectable_level() {
    let mut supervisor = supervise(
        world(10),
        settings(r#"{"acceleration_limiter": 20, "default_starting_acceleration": 6}"#),
    );
    supervisor.begin_travel(wayrest(), false).unwrap();
    assert_eq!(supervisor.time_scale_state().multiplier, 20);

    for _ in 0..5 {
        supervisor.surface().borrow_mut().faster();
    }
    supervisor.pump();
    assert!((supervisor.host().time_scale() - 20.0).abs() < f64::EPSILON);
}

#[test]
fn session_signals_discard_the_journey() {
    for signal in [WorldSignal::SessionLoaded, WorldSignal::NewSession] {
        let mut supervisor = supervise(world(10), TravelSettings::default_config());
        supervisor.begin_travel(wayrest(), false).unwrap();
        supervisor.tick();

        supervisor.signal_bus().borrow_mut().publish(signal);
        supervisor.pump();

        assert_eq!(supervisor.state(), SupervisorState::Idle);
        assert!(supervisor.journey().is_none());
        assert_eq!(supervisor.host().record().input_restores, 1);
    }
}

#[test]
fn clear_destination_stops_and_forgets() {
    let mut supervisor = supervise(world(10), TravelSettings::default_config());
    supervisor.begin_travel(wayrest(), false).unwrap();
    supervisor.clear_destination();
    assert!(supervisor.journey().is_none());
    assert!(!supervisor.autopilot_active());
    assert_eq!(supervisor.resume_travel(), Err(TravelError::NoDestination));
}
