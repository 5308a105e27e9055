//! Collaborators the supervisor drives. Platform layers implement these;
//! [`crate::headless::HeadlessWorld`] is the in-memory implementation.
use crate::avoidance::{AgentSkills, AvoidanceRequest};
use crate::journey::{Location, MapSummary, SimTime};

/// Resolves map summaries into world locations.
pub trait DestinationResolver {
    fn resolve(&self, summary: MapSummary) -> Option<Location>;
}

/// Result of advancing the autopilot by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutopilotStatus {
    EnRoute,
    Arrived,
}

/// Stepwise navigation toward a destination.
pub trait Autopilot {
    type World: ?Sized;

    /// Advance one tick. Reporting `Arrived` is the arrival callback.
    fn tick(&mut self, world: &mut Self::World) -> AutopilotStatus;

    /// Turn to face the destination and stop moving.
    fn look_at_destination_and_stop(&mut self, world: &mut Self::World);
}

/// Read-only view of the agent and its surroundings.
pub trait WorldProbe {
    fn now(&self) -> SimTime;
    /// Current health as a fraction of maximum, `0.0..=1.0`.
    fn health_fraction(&self) -> f32;
    fn fatigue(&self) -> i32;
    /// Fatigue carried by one unit for this agent.
    fn fatigue_unit(&self) -> i32;
    fn disease_count(&self) -> u32;
    fn enemies_nearby(&self) -> bool;
    fn current_location(&self) -> Option<Location>;
    fn skills(&self) -> AgentSkills;
}

/// Weather, audio and external-module toggles suspended while travelling.
pub trait AmbientSystems {
    fn set_precipitation_particles(&mut self, enabled: bool);
    fn set_player_weather(&mut self, enabled: bool);
    fn set_footsteps(&mut self, enabled: bool);
    fn set_transport_audio(&mut self, enabled: bool);
    /// Fire-and-forget message to a named external module. Delivery failures
    /// are ignored by the caller.
    fn send_module_message(&mut self, module: &str, message: &str, value: bool) -> bool;
}

pub trait InputHost {
    /// Re-enable mouse look and lock the cursor again.
    fn restore_default_input(&mut self);
}

/// User-facing notices.
pub trait Notifier {
    fn message_box(&mut self, text: &str);
    fn mid_screen_text(&mut self, text: &str, seconds: f32);
    /// Show the yes/no avoidance prompt; the answer arrives later through
    /// [`crate::supervisor::JourneySupervisor::resolve_avoidance`].
    fn avoidance_prompt(&mut self, request: &AvoidanceRequest);
    fn show_health_status(&mut self);
    fn refresh_vitals(&mut self);
}

/// Global simulation clock controls.
pub trait TimeHost {
    fn set_time_scale(&mut self, scale: f64);
    fn set_fixed_step(&mut self, step: f64);
}

/// Everything the supervisor needs from the host simulation.
pub trait TravelHost:
    DestinationResolver + WorldProbe + AmbientSystems + InputHost + Notifier + TimeHost
{
    type Autopilot: Autopilot<World = Self>;

    fn spawn_autopilot(&mut self, destination: &Location) -> Self::Autopilot;
}
