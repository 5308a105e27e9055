//! Journey supervisor: owns the active journey, drives the autopilot and
//! decides each tick whether travel continues, pauses or stops.
//!
//! States:
//! - `Idle`: no autopilot; a destination may still be retained.
//! - `Travelling`: the autopilot advances every tick under acceleration.
//! - `Paused`: the autopilot stays allocated but is not advanced.
//! - `Negotiating`: waiting for the user's answer to an avoidance prompt.
//!
//! Shared host resources (time scale, ambient systems, input mode, the
//! location-entry subscription) are restored on every path back to `Idle`.
use log::{debug, info, warn};
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::avoidance::{
    AvoidanceAttemptOutcome, AvoidanceChoice, AvoidanceRequest, AvoidanceTicket,
    EncounterAvoidanceNegotiator,
};
use crate::constants::{
    ARRIVAL_NOTICE_SECONDS, EXTERNAL_TOGGLE_MESSAGE, LOG_TARGET, MSG_ARRIVED, MSG_AVOID_FAIL,
    MSG_ENEMIES, MSG_LOW_FATIGUE, MSG_LOW_HEALTH, enter_location_message, near_location_message,
};
use crate::control::{SurfaceIntent, TravelControlSurface};
use crate::error::{SettingsError, TravelError};
use crate::events::{EventJournal, TravelEvent};
use crate::host::{Autopilot, AutopilotStatus, TravelHost};
use crate::journey::{Journey, Location, MapSummary, PauseReason, SimTime};
use crate::policy::{TickSnapshot, first_pause};
use crate::rng::CountingRng;
use crate::settings::{LocationPauseMode, TravelSettings};
use crate::signals::{SignalBus, SignalKind, Subscription, WorldSignal};
use crate::time_scale::{AccelerationLadder, TimeScaleController, TimeScaleState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SupervisorState {
    #[default]
    Idle,
    Travelling,
    Paused {
        reason: PauseReason,
    },
    Negotiating {
        ticket: AvoidanceTicket,
    },
}

pub struct JourneySupervisor<H: TravelHost> {
    host: H,
    settings: TravelSettings,
    surface: Rc<RefCell<TravelControlSurface>>,
    bus: Rc<RefCell<SignalBus>>,
    time_scale: TimeScaleController,
    negotiator: EncounterAvoidanceNegotiator,
    rng: CountingRng<SmallRng>,
    state: SupervisorState,
    journey: Option<Journey>,
    autopilot: Option<H::Autopilot>,
    location_subscription: Option<Subscription>,
    standing_subscriptions: Vec<Subscription>,
    pending_avoidance: Option<AvoidanceRequest>,
    immunity_expiry: Option<SimTime>,
    disease_snapshot: u32,
    ambient_suspended: bool,
    last_reason: PauseReason,
    journal: EventJournal,
}

impl<H: TravelHost> JourneySupervisor<H> {
    /// Build a supervisor with its own signal bus.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation.
    pub fn new(host: H, settings: TravelSettings, seed: u64) -> Result<Self, SettingsError> {
        Self::with_bus(host, settings, seed, Rc::new(RefCell::new(SignalBus::new())))
    }

    /// Build a supervisor on a signal bus shared with the host.
    ///
    /// Subscribes to the global encounter signal and both session lifecycle
    /// signals for the supervisor's lifetime.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings fail validation.
    pub fn with_bus(
        host: H,
        settings: TravelSettings,
        seed: u64,
        bus: Rc<RefCell<SignalBus>>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let ladder = AccelerationLadder::new(
            settings.acceleration_ladder.clone(),
            settings.acceleration_limiter,
        );
        let surface = Rc::new(RefCell::new(TravelControlSurface::new(
            ladder.clone(),
            settings.default_starting_acceleration,
        )));
        let standing_subscriptions = {
            let mut bus = bus.borrow_mut();
            vec![
                bus.subscribe(SignalKind::Encounter),
                bus.subscribe(SignalKind::SessionLoaded),
                bus.subscribe(SignalKind::NewSession),
            ]
        };
        let time_scale = TimeScaleController::new(ladder, settings.baseline_fixed_step);
        let negotiator = EncounterAvoidanceNegotiator::new(settings.max_chance_to_avoid_encounter);
        info!(target: LOG_TARGET, "Travel supervisor ready");
        Ok(Self {
            host,
            settings,
            surface,
            bus,
            time_scale,
            negotiator,
            rng: CountingRng::avoidance(seed),
            state: SupervisorState::Idle,
            journey: None,
            autopilot: None,
            location_subscription: None,
            standing_subscriptions,
            pending_avoidance: None,
            immunity_expiry: None,
            disease_snapshot: 0,
            ambient_suspended: false,
            last_reason: PauseReason::None,
            journal: EventJournal::default(),
        })
    }

    /// Stop any journey, release every subscription and hand the host back.
    pub fn shutdown(mut self) -> H {
        self.halt(PauseReason::None);
        let standing = std::mem::take(&mut self.standing_subscriptions);
        {
            let mut bus = self.bus.borrow_mut();
            for subscription in standing {
                bus.unsubscribe(subscription);
            }
        }
        info!(target: LOG_TARGET, "Travel supervisor shut down");
        self.host
    }

    // Accessors ------------------------------------------------------------

    #[must_use]
    pub const fn state(&self) -> SupervisorState {
        self.state
    }

    #[must_use]
    pub const fn journey(&self) -> Option<&Journey> {
        self.journey.as_ref()
    }

    #[must_use]
    pub fn destination_name(&self) -> Option<&str> {
        self.journey
            .as_ref()
            .map(|journey| journey.destination_name.as_str())
    }

    #[must_use]
    pub const fn last_reason(&self) -> PauseReason {
        self.last_reason
    }

    #[must_use]
    pub const fn is_travelling(&self) -> bool {
        matches!(self.state, SupervisorState::Travelling)
    }

    #[must_use]
    pub const fn autopilot_active(&self) -> bool {
        self.autopilot.is_some()
    }

    #[must_use]
    pub const fn immunity_expiry(&self) -> Option<SimTime> {
        self.immunity_expiry
    }

    #[must_use]
    pub const fn pending_avoidance(&self) -> Option<&AvoidanceRequest> {
        self.pending_avoidance.as_ref()
    }

    #[must_use]
    pub const fn time_scale_state(&self) -> TimeScaleState {
        self.time_scale.state()
    }

    #[must_use]
    pub const fn has_location_subscription(&self) -> bool {
        self.location_subscription.is_some()
    }

    #[must_use]
    pub const fn settings(&self) -> &TravelSettings {
        &self.settings
    }

    /// Shared handle to the control surface for the presentation layer.
    #[must_use]
    pub fn surface(&self) -> Rc<RefCell<TravelControlSurface>> {
        Rc::clone(&self.surface)
    }

    #[must_use]
    pub fn signal_bus(&self) -> Rc<RefCell<SignalBus>> {
        Rc::clone(&self.bus)
    }

    #[must_use]
    pub const fn host(&self) -> &H {
        &self.host
    }

    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn with_host_mut<R>(&mut self, f: impl FnOnce(&mut H) -> R) -> R {
        f(&mut self.host)
    }

    pub fn events(&self) -> impl Iterator<Item = &TravelEvent> {
        self.journal.iter()
    }

    pub fn drain_events(&mut self) -> Vec<TravelEvent> {
        self.journal.drain()
    }

    /// Draws taken from the avoidance stream so far.
    #[must_use]
    pub const fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    /// Deterministically replace the avoidance stream.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = CountingRng::avoidance(seed);
    }

    // Lifecycle ------------------------------------------------------------

    /// Begin a fresh journey, superseding any journey already in progress.
    ///
    /// # Errors
    ///
    /// Returns [`TravelError::DestinationNotFound`] when the host cannot
    /// resolve `destination`; nothing is changed in that case.
    pub fn begin_travel(
        &mut self,
        destination: MapSummary,
        cautious: bool,
    ) -> Result<(), TravelError> {
        let Some(location) = self.host.resolve(destination) else {
            warn!(
                target: LOG_TARGET,
                "Destination not found: region {} map {}",
                destination.region_index,
                destination.map_index
            );
            return Err(TravelError::DestinationNotFound(destination));
        };

        if let Some(previous) = self.journey.take() {
            info!(
                target: LOG_TARGET,
                "Superseding journey to {}", previous.destination_name
            );
            self.halt(PauseReason::None);
        }

        let now = self.host.now();
        self.surface
            .borrow_mut()
            .set_destination(Some(&location.name));
        self.journey = Some(Journey::new(
            destination,
            location.name.clone(),
            cautious,
            now,
        ));
        self.pending_avoidance = None;
        let multiplier = self.engage(Some(location))?;
        let destination = self.destination_name().unwrap_or_default().to_string();
        self.journal.push(TravelEvent::Began {
            destination,
            cautious,
            multiplier,
        });
        Ok(())
    }

    /// Begin a journey using the configured cautious-travel default.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_travel`].
    pub fn begin_travel_with_defaults(
        &mut self,
        destination: MapSummary,
    ) -> Result<(), TravelError> {
        self.begin_travel(destination, self.settings.cautious_travel)
    }

    /// Continue the retained journey after a pause or interrupt.
    ///
    /// # Errors
    ///
    /// Returns [`TravelError::NoDestination`] when no journey is retained, or
    /// [`TravelError::DestinationNotFound`] if a new autopilot is needed and
    /// the destination no longer resolves.
    pub fn resume_travel(&mut self) -> Result<(), TravelError> {
        if self.journey.is_none() {
            return Err(TravelError::NoDestination);
        }
        if self.is_travelling() {
            return Ok(());
        }
        self.pending_avoidance = None;
        let multiplier = self.engage(None)?;
        let destination = self.destination_name().unwrap_or_default().to_string();
        self.journal.push(TravelEvent::Resumed {
            destination,
            multiplier,
        });
        Ok(())
    }

    /// Stop travel but keep the destination. Safe to call when idle.
    pub fn interrupt_travel(&mut self) {
        self.halt(PauseReason::None);
    }

    /// Stop travel and forget the destination.
    pub fn clear_destination(&mut self) {
        self.stop(PauseReason::UserCancelled);
    }

    /// Answer an outstanding avoidance prompt.
    ///
    /// Declining leaves the journey paused. A successful attempt grants an
    /// immunity window and resumes travel; a failed one leaves it paused.
    ///
    /// # Errors
    ///
    /// Returns an error if no prompt is pending or `ticket` is not the
    /// pending one.
    pub fn resolve_avoidance(
        &mut self,
        ticket: AvoidanceTicket,
        choice: AvoidanceChoice,
    ) -> Result<Option<AvoidanceAttemptOutcome>, TravelError> {
        let pending = self
            .pending_avoidance
            .as_ref()
            .ok_or(TravelError::NoPendingAvoidance)?;
        if pending.ticket != ticket {
            return Err(TravelError::StaleAvoidanceTicket {
                given: ticket.0,
                pending: pending.ticket.0,
            });
        }
        let Some(request) = self.pending_avoidance.take() else {
            return Err(TravelError::NoPendingAvoidance);
        };

        let now = self.host.now();
        match self
            .negotiator
            .resolve(&request, choice, now, &mut self.rng)
        {
            None => {
                self.set_paused(PauseReason::EncounterDetected);
                self.journal.push(TravelEvent::AvoidanceDeclined { ticket });
                Ok(None)
            }
            Some(outcome) if outcome.succeeded => {
                self.immunity_expiry = outcome.immunity_expiry;
                self.journal
                    .push(TravelEvent::AvoidanceResolved { ticket, outcome });
                self.resume_travel()?;
                Ok(Some(outcome))
            }
            Some(outcome) => {
                self.journal
                    .push(TravelEvent::AvoidanceResolved { ticket, outcome });
                self.host.message_box(MSG_AVOID_FAIL);
                self.set_paused(PauseReason::EncounterAvoided { succeeded: false });
                Ok(Some(outcome))
            }
        }
    }

    // Per-tick -------------------------------------------------------------

    /// Deliver queued world signals and surface intents.
    ///
    /// Signals are handled before intents, and both before the next tick's
    /// policy evaluation.
    pub fn pump(&mut self) {
        loop {
            let signal = self.bus.borrow_mut().next_signal();
            if let Some(signal) = signal {
                self.handle_signal(signal);
                continue;
            }
            if !self.drain_surface_intents() {
                break;
            }
        }
    }

    /// Handle queued surface intents. Returns false when there were none.
    fn drain_surface_intents(&mut self) -> bool {
        let intents = self.surface.borrow_mut().drain_intents();
        if intents.is_empty() {
            return false;
        }
        for intent in intents {
            self.handle_intent(intent);
        }
        true
    }

    /// One host simulation tick.
    pub fn tick(&mut self) {
        self.pump();
        if !self.is_travelling() {
            return;
        }
        let Some(autopilot) = self.autopilot.as_mut() else {
            return;
        };

        {
            let mut surface = self.surface.borrow_mut();
            if !surface.is_showing() {
                surface.show();
            }
        }

        let status = autopilot.tick(&mut self.host);
        self.host.refresh_vitals();
        if status == AutopilotStatus::Arrived {
            self.arrive();
            return;
        }
        self.evaluate();
    }

    fn evaluate(&mut self) {
        let Some(journey) = self.journey.as_ref() else {
            return;
        };
        let now = self.host.now();
        if self.immunity_expiry.is_some_and(|expiry| now >= expiry) {
            self.immunity_expiry = None;
        }

        let current = self.host.current_location();
        let snapshot = TickSnapshot {
            cautious: journey.cautious,
            health_fraction: self.host.health_fraction(),
            fatigue: self.host.fatigue(),
            fatigue_unit: self.host.fatigue_unit(),
            location_pause: self.settings.location_pause,
            current_location: current.as_ref().map(|location| location.id),
            last_known_location: journey.last_known_location,
            enemies_nearby: self.host.enemies_nearby(),
            immune: self.immunity_expiry.is_some(),
        };

        if let Some(reason) = first_pause(&snapshot) {
            self.apply_pause_rule(reason, current);
            return;
        }
        self.check_disease();
    }

    fn apply_pause_rule(&mut self, reason: PauseReason, current: Option<Location>) {
        match reason {
            PauseReason::LowHealth => self.pause(reason, MSG_LOW_HEALTH),
            PauseReason::LowFatigue => self.pause(reason, MSG_LOW_FATIGUE),
            PauseReason::NearLocation => {
                let Some(location) = current else {
                    return;
                };
                if let Some(journey) = self.journey.as_mut() {
                    journey.last_known_location = Some(location.id);
                }
                let message = near_location_message(&location.kind, &location.name);
                self.pause(reason, &message);
            }
            PauseReason::EncounterDetected => {
                debug!(target: LOG_TARGET, "Enemies encountered during travel");
                if self.settings.avoid_random_encounters {
                    self.open_negotiation();
                } else {
                    self.pause(reason, MSG_ENEMIES);
                }
            }
            _ => {}
        }
    }

    fn check_disease(&mut self) {
        let current = self.host.disease_count();
        if current > self.disease_snapshot {
            info!(target: LOG_TARGET, "New disease detected, interrupting travel!");
            self.halt(PauseReason::DiseaseOnset);
            self.host.show_health_status();
        }
        self.disease_snapshot = current;
    }

    fn open_negotiation(&mut self) {
        self.stand_down();
        let request = self.negotiator.request(self.host.skills());
        self.host.avoidance_prompt(&request);
        self.state = SupervisorState::Negotiating {
            ticket: request.ticket,
        };
        self.journal.push(TravelEvent::NegotiationOpened {
            ticket: request.ticket,
            success_chance: request.success_chance,
        });
        self.pending_avoidance = Some(request);
    }

    fn arrive(&mut self) {
        let now = self.host.now();
        let (destination, elapsed) = self
            .journey
            .as_ref()
            .map(|journey| (journey.destination_name.clone(), journey.elapsed(now)))
            .unwrap_or_default();

        // World signals raised on the final step are left for the next pump,
        // where nothing is travelling any more.
        self.surface.borrow_mut().cancel();
        while self.drain_surface_intents() {}

        self.host.mid_screen_text(MSG_ARRIVED, ARRIVAL_NOTICE_SECONDS);
        info!(target: LOG_TARGET, "Elapsed time for trip: {elapsed}");
        self.last_reason = PauseReason::Arrived;
        self.journal.push(TravelEvent::Arrived {
            destination,
            elapsed,
        });
    }

    // Signals and intents --------------------------------------------------

    fn handle_signal(&mut self, signal: WorldSignal) {
        match signal {
            WorldSignal::EnteredLocation(location) => {
                if self.location_subscription.is_none() || !self.is_travelling() {
                    return;
                }
                let message = enter_location_message(&location.kind, &location.name);
                self.pause(PauseReason::EnteredLocation, &message);
            }
            WorldSignal::Encounter => {
                if !self.is_travelling() {
                    return;
                }
                if let Some(until) = self.immunity_expiry {
                    if self.host.now() < until {
                        self.journal.push(TravelEvent::EncounterIgnored { until });
                        return;
                    }
                    self.immunity_expiry = None;
                }
                self.pause(PauseReason::EncounterDetected, MSG_ENEMIES);
            }
            WorldSignal::SessionLoaded | WorldSignal::NewSession => {
                self.discard_journey(PauseReason::None);
            }
        }
    }

    fn handle_intent(&mut self, intent: SurfaceIntent) {
        match intent {
            SurfaceIntent::Cancel => self.stop(PauseReason::UserCancelled),
            SurfaceIntent::Close => self.stop(PauseReason::UserClosed),
            SurfaceIntent::AccelerationChanged(level) => {
                let level = self.time_scale.ladder().clamp_level(level);
                if self.is_travelling() {
                    self.time_scale.apply(&mut self.host, level);
                }
                self.journal.push(TravelEvent::AccelerationChanged {
                    level,
                    multiplier: self.time_scale.ladder().multiplier(level),
                });
            }
        }
    }

    // Transitions ----------------------------------------------------------

    /// Resume path shared by fresh and continued journeys.
    fn engage(&mut self, resolved: Option<Location>) -> Result<u32, TravelError> {
        let Some(destination) = self.journey.as_ref().map(|journey| journey.destination) else {
            return Err(TravelError::NoDestination);
        };
        if self.autopilot.is_none() {
            let location = match resolved {
                Some(location) => location,
                None => self
                    .host
                    .resolve(destination)
                    .ok_or(TravelError::DestinationNotFound(destination))?,
            };
            self.autopilot = Some(self.host.spawn_autopilot(&location));
        }

        let current = self.host.current_location().map(|location| location.id);
        if let Some(journey) = self.journey.as_mut() {
            journey.last_known_location = current;
        }

        let level = {
            let surface = self.surface.borrow();
            self.time_scale
                .ladder()
                .clamp_level(surface.acceleration_level())
        };
        self.time_scale.apply(&mut self.host, level);
        self.suspend_ambient();
        self.disease_snapshot = self.host.disease_count();

        if self.settings.location_pause == LocationPauseMode::Enter
            && self.location_subscription.is_none()
        {
            self.location_subscription = Some(
                self.bus
                    .borrow_mut()
                    .subscribe(SignalKind::EnterLocation),
            );
        }

        self.state = SupervisorState::Travelling;
        self.surface.borrow_mut().show();
        info!(
            target: LOG_TARGET,
            "Begun travel to {}",
            self.destination_name().unwrap_or_default()
        );
        Ok(self.time_scale.state().multiplier)
    }

    fn pause(&mut self, reason: PauseReason, message: &str) {
        self.stand_down();
        self.host.message_box(message);
        self.set_paused(reason);
        info!(target: LOG_TARGET, "Travel paused: {}", reason.key());
    }

    /// Hand the host back while the journey waits: real time, ambient
    /// systems and default input. The autopilot and location subscription
    /// are kept for resume.
    fn stand_down(&mut self) {
        self.time_scale.restore_baseline(&mut self.host);
        self.surface.borrow_mut().withdraw();
        self.restore_ambient();
        self.host.restore_default_input();
    }

    fn set_paused(&mut self, reason: PauseReason) {
        self.state = SupervisorState::Paused { reason };
        self.last_reason = reason;
        self.journal.push(TravelEvent::Paused { reason });
    }

    const fn is_engaged(&self) -> bool {
        self.autopilot.is_some()
            || self.ambient_suspended
            || self.location_subscription.is_some()
            || !matches!(self.state, SupervisorState::Idle)
    }

    /// Return every shared resource to its default and drop the autopilot.
    /// Returns false when there was nothing to stop.
    fn halt(&mut self, reason: PauseReason) -> bool {
        if !self.is_engaged() {
            return false;
        }
        info!(target: LOG_TARGET, "Travel interrupted");
        self.time_scale.restore_baseline(&mut self.host);
        self.host.restore_default_input();
        if let Some(mut autopilot) = self.autopilot.take() {
            autopilot.look_at_destination_and_stop(&mut self.host);
        }
        self.restore_ambient();
        if let Some(subscription) = self.location_subscription.take() {
            self.bus.borrow_mut().unsubscribe(subscription);
        }
        self.pending_avoidance = None;
        self.state = SupervisorState::Idle;
        self.surface.borrow_mut().withdraw();
        self.last_reason = reason;
        self.journal.push(TravelEvent::Interrupted { reason });
        true
    }

    /// User-driven stop; cancelling also forgets the destination.
    fn stop(&mut self, reason: PauseReason) {
        if reason.clears_journey() {
            self.discard_journey(reason);
        } else {
            self.halt(reason);
        }
    }

    fn discard_journey(&mut self, reason: PauseReason) {
        self.halt(reason);
        self.surface.borrow_mut().set_destination(None);
        if self.journey.take().is_some() {
            self.last_reason = reason;
            self.journal.push(TravelEvent::DestinationCleared);
        }
    }

    fn suspend_ambient(&mut self) {
        if self.ambient_suspended {
            return;
        }
        self.host.set_precipitation_particles(false);
        self.host.set_player_weather(false);
        self.host.set_footsteps(false);
        self.host.set_transport_audio(false);
        self.send_external_toggles(false);
        self.ambient_suspended = true;
    }

    fn restore_ambient(&mut self) {
        if !self.ambient_suspended {
            return;
        }
        self.host.set_player_weather(true);
        self.host.set_footsteps(true);
        self.host.set_transport_audio(true);
        self.send_external_toggles(true);
        self.ambient_suspended = false;
    }

    fn send_external_toggles(&mut self, enabled: bool) {
        for module in &self.settings.external_toggles {
            if !self
                .host
                .send_module_message(module, EXTERNAL_TOGGLE_MESSAGE, enabled)
            {
                debug!(target: LOG_TARGET, "No receiver for toggle message to {module}");
            }
        }
    }
}
