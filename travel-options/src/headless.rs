//! In-memory host used by tests and the scenario tester.
//!
//! [`HeadlessWorld`] records every call the supervisor makes and advances a
//! simple clock. Travel is measured in autopilot steps; each step covers
//! `seconds_per_step` simulation seconds scaled by the current time scale.
//! World changes can be scheduled against the global step counter to script
//! encounters, injuries and location arrivals.
use log::trace;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

use crate::avoidance::{AgentSkills, AvoidanceRequest};
use crate::constants::LOG_TARGET;
use crate::host::{
    AmbientSystems, Autopilot, AutopilotStatus, DestinationResolver, InputHost, Notifier,
    TimeHost, TravelHost, WorldProbe,
};
use crate::journey::{Location, LocationRef, MapSummary, SimTime};
use crate::numbers::{ratio_f32, scaled_seconds};
use crate::signals::{SignalBus, WorldSignal};

const DEFAULT_ROUTE_STEPS: u32 = 10;
const DEFAULT_SECONDS_PER_STEP: u64 = 1;
const DEFAULT_MAX_HEALTH: i32 = 100;
const DEFAULT_FATIGUE_UNIT: i32 = 64;

/// A scripted change applied when the world reaches a given step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum WorldChange {
    SetHealth { current: i32 },
    SetFatigue { fatigue: i32 },
    ContractDisease,
    CureDisease,
    SetEnemies { nearby: bool },
    /// The agent is now near `location` without having entered it.
    Approach { location: Location },
    /// The agent has entered `location`; published as an entry signal.
    Enter { location: Location },
    LeaveLocation,
    /// Raise the global encounter signal.
    EncounterSignal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientFlags {
    pub precipitation_particles: bool,
    pub player_weather: bool,
    pub footsteps: bool,
    pub transport_audio: bool,
}

impl Default for AmbientFlags {
    fn default() -> Self {
        Self {
            precipitation_particles: true,
            player_weather: true,
            footsteps: true,
            transport_audio: true,
        }
    }
}

/// One delivered external-module message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleMessage {
    pub module: String,
    pub message: String,
    pub value: bool,
}

/// Everything observable about what the supervisor asked of the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostRecord {
    pub message_boxes: Vec<String>,
    pub mid_screen: Vec<(String, f32)>,
    pub avoidance_prompts: Vec<AvoidanceRequest>,
    pub module_messages: Vec<ModuleMessage>,
    pub time_scales: Vec<f64>,
    pub fixed_steps: Vec<f64>,
    pub input_restores: u32,
    pub health_status_shown: u32,
    pub vitals_refreshes: u32,
    pub autopilots_spawned: u32,
    pub look_at_destination: u32,
    pub arrivals: u32,
}

#[derive(Debug)]
pub struct HeadlessWorld {
    now: SimTime,
    seconds_per_step: u64,
    steps_taken: u32,
    time_scale: f64,
    fixed_step: f64,
    health: i32,
    max_health: i32,
    fatigue: i32,
    fatigue_unit: i32,
    diseases: u32,
    enemies_nearby: bool,
    skills: AgentSkills,
    current_location: Option<Location>,
    destinations: BTreeMap<MapSummary, Location>,
    route_steps: u32,
    progress: BTreeMap<LocationRef, u32>,
    script: BTreeMap<u32, Vec<WorldChange>>,
    modules: BTreeSet<String>,
    ambient: AmbientFlags,
    bus: Option<Rc<RefCell<SignalBus>>>,
    record: HostRecord,
}

impl Default for HeadlessWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: SimTime(0),
            seconds_per_step: DEFAULT_SECONDS_PER_STEP,
            steps_taken: 0,
            time_scale: 1.0,
            fixed_step: 0.0,
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            fatigue: DEFAULT_FATIGUE_UNIT * 24,
            fatigue_unit: DEFAULT_FATIGUE_UNIT,
            diseases: 0,
            enemies_nearby: false,
            skills: AgentSkills::default(),
            current_location: None,
            destinations: BTreeMap::new(),
            route_steps: DEFAULT_ROUTE_STEPS,
            progress: BTreeMap::new(),
            script: BTreeMap::new(),
            modules: BTreeSet::new(),
            ambient: AmbientFlags::default(),
            bus: None,
            record: HostRecord::default(),
        }
    }

    /// Register a resolvable destination.
    #[must_use]
    pub fn with_destination(mut self, summary: MapSummary, name: &str, kind: &str) -> Self {
        self.add_destination(summary, name, kind);
        self
    }

    pub fn add_destination(&mut self, summary: MapSummary, name: &str, kind: &str) {
        self.destinations
            .insert(summary, Location::new(summary.location_ref(), name, kind));
    }

    /// Steps an autopilot needs from spawn to arrival at any destination.
    #[must_use]
    pub const fn with_route_steps(mut self, steps: u32) -> Self {
        self.route_steps = steps;
        self
    }

    #[must_use]
    pub const fn with_seconds_per_step(mut self, seconds: u64) -> Self {
        self.seconds_per_step = seconds;
        self
    }

    #[must_use]
    pub const fn with_skills(mut self, skills: AgentSkills) -> Self {
        self.skills = skills;
        self
    }

    /// Make `module` a known receiver for external toggle messages.
    #[must_use]
    pub fn with_module(mut self, module: &str) -> Self {
        self.modules.insert(module.to_string());
        self
    }

    /// Publish entry and encounter signals on `bus`.
    pub fn attach_bus(&mut self, bus: Rc<RefCell<SignalBus>>) {
        self.bus = Some(bus);
    }

    /// Apply `change` once the world has taken `step` autopilot steps.
    pub fn schedule(&mut self, step: u32, change: WorldChange) {
        self.script.entry(step).or_default().push(change);
    }

    /// Apply a change immediately, as though it happened this instant.
    pub fn apply(&mut self, change: WorldChange) {
        trace!(
            target: LOG_TARGET,
            "headless world change at {}: {change:?}",
            self.now
        );
        match change {
            WorldChange::SetHealth { current } => {
                self.health = current.clamp(0, self.max_health);
            }
            WorldChange::SetFatigue { fatigue } => self.fatigue = fatigue.max(0),
            WorldChange::ContractDisease => self.diseases = self.diseases.saturating_add(1),
            WorldChange::CureDisease => self.diseases = self.diseases.saturating_sub(1),
            WorldChange::SetEnemies { nearby } => self.enemies_nearby = nearby,
            WorldChange::Approach { location } => self.current_location = Some(location),
            WorldChange::Enter { location } => {
                self.current_location = Some(location.clone());
                self.publish(WorldSignal::EnteredLocation(location));
            }
            WorldChange::LeaveLocation => self.current_location = None,
            WorldChange::EncounterSignal => self.publish(WorldSignal::Encounter),
        }
    }

    /// Move the clock forward without travelling.
    pub const fn advance_clock(&mut self, seconds: u64) {
        self.now = SimTime(self.now.0.saturating_add(seconds));
    }

    pub fn set_skills(&mut self, skills: AgentSkills) {
        self.skills = skills;
    }

    #[must_use]
    pub const fn record(&self) -> &HostRecord {
        &self.record
    }

    #[must_use]
    pub const fn ambient(&self) -> AmbientFlags {
        self.ambient
    }

    #[must_use]
    pub const fn time_scale(&self) -> f64 {
        self.time_scale
    }

    #[must_use]
    pub const fn fixed_step(&self) -> f64 {
        self.fixed_step
    }

    #[must_use]
    pub const fn steps_taken(&self) -> u32 {
        self.steps_taken
    }

    /// Remaining steps toward `destination`, if travel toward it has begun.
    #[must_use]
    pub fn remaining_steps(&self, destination: LocationRef) -> Option<u32> {
        self.progress.get(&destination).copied()
    }

    fn publish(&self, signal: WorldSignal) {
        if let Some(bus) = &self.bus {
            bus.borrow_mut().publish(signal);
        }
    }

    fn step_toward(&mut self, destination: LocationRef) -> AutopilotStatus {
        self.steps_taken = self.steps_taken.saturating_add(1);
        self.advance_clock(scaled_seconds(self.seconds_per_step, self.time_scale));
        if let Some(changes) = self.script.remove(&self.steps_taken) {
            for change in changes {
                self.apply(change);
            }
        }

        let remaining = self
            .progress
            .entry(destination)
            .or_insert(self.route_steps);
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return AutopilotStatus::EnRoute;
        }
        self.progress.remove(&destination);
        self.record.arrivals += 1;
        AutopilotStatus::Arrived
    }
}

/// Autopilot that walks a fixed number of steps toward its destination.
#[derive(Debug)]
pub struct HeadlessAutopilot {
    destination: LocationRef,
    stopped: bool,
}

impl HeadlessAutopilot {
    #[must_use]
    pub const fn destination(&self) -> LocationRef {
        self.destination
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl Autopilot for HeadlessAutopilot {
    type World = HeadlessWorld;

    fn tick(&mut self, world: &mut HeadlessWorld) -> AutopilotStatus {
        if self.stopped {
            return AutopilotStatus::EnRoute;
        }
        world.step_toward(self.destination)
    }

    fn look_at_destination_and_stop(&mut self, world: &mut HeadlessWorld) {
        self.stopped = true;
        world.record.look_at_destination += 1;
    }
}

impl DestinationResolver for HeadlessWorld {
    fn resolve(&self, summary: MapSummary) -> Option<Location> {
        self.destinations.get(&summary).cloned()
    }
}

impl WorldProbe for HeadlessWorld {
    fn now(&self) -> SimTime {
        self.now
    }

    fn health_fraction(&self) -> f32 {
        ratio_f32(self.health, self.max_health)
    }

    fn fatigue(&self) -> i32 {
        self.fatigue
    }

    fn fatigue_unit(&self) -> i32 {
        self.fatigue_unit
    }

    fn disease_count(&self) -> u32 {
        self.diseases
    }

    fn enemies_nearby(&self) -> bool {
        self.enemies_nearby
    }

    fn current_location(&self) -> Option<Location> {
        self.current_location.clone()
    }

    fn skills(&self) -> AgentSkills {
        self.skills
    }
}

impl AmbientSystems for HeadlessWorld {
    fn set_precipitation_particles(&mut self, enabled: bool) {
        self.ambient.precipitation_particles = enabled;
    }

    fn set_player_weather(&mut self, enabled: bool) {
        self.ambient.player_weather = enabled;
    }

    fn set_footsteps(&mut self, enabled: bool) {
        self.ambient.footsteps = enabled;
    }

    fn set_transport_audio(&mut self, enabled: bool) {
        self.ambient.transport_audio = enabled;
    }

    fn send_module_message(&mut self, module: &str, message: &str, value: bool) -> bool {
        if !self.modules.contains(module) {
            return false;
        }
        self.record.module_messages.push(ModuleMessage {
            module: module.to_string(),
            message: message.to_string(),
            value,
        });
        true
    }
}

impl InputHost for HeadlessWorld {
    fn restore_default_input(&mut self) {
        self.record.input_restores += 1;
    }
}

impl Notifier for HeadlessWorld {
    fn message_box(&mut self, text: &str) {
        self.record.message_boxes.push(text.to_string());
    }

    fn mid_screen_text(&mut self, text: &str, seconds: f32) {
        self.record.mid_screen.push((text.to_string(), seconds));
    }

    fn avoidance_prompt(&mut self, request: &AvoidanceRequest) {
        self.record.avoidance_prompts.push(request.clone());
    }

    fn show_health_status(&mut self) {
        self.record.health_status_shown += 1;
    }

    fn refresh_vitals(&mut self) {
        self.record.vitals_refreshes += 1;
    }
}

impl TimeHost for HeadlessWorld {
    fn set_time_scale(&mut self, scale: f64) {
        self.time_scale = scale;
        self.record.time_scales.push(scale);
    }

    fn set_fixed_step(&mut self, step: f64) {
        self.fixed_step = step;
        self.record.fixed_steps.push(step);
    }
}

impl TravelHost for HeadlessWorld {
    type Autopilot = HeadlessAutopilot;

    fn spawn_autopilot(&mut self, destination: &Location) -> HeadlessAutopilot {
        self.record.autopilots_spawned += 1;
        HeadlessAutopilot {
            destination: destination.id,
            stopped: false,
        }
    }
}
