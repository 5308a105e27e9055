//! Travel Options
//!
//! Platform-agnostic supervision of automated long-distance travel: a journey
//! supervisor that drives an autopilot under time acceleration, pauses for
//! danger or nearby places, negotiates encounter avoidance and restores every
//! shared host resource when travel stops. Host engines plug in through the
//! traits in [`host`].

pub mod avoidance;
pub mod constants;
pub mod control;
pub mod error;
pub mod events;
pub mod headless;
pub mod host;
pub mod journey;
pub mod numbers;
pub mod policy;
pub mod rng;
pub mod settings;
pub mod signals;
pub mod supervisor;
pub mod time_scale;

// Re-export commonly used types
pub use avoidance::{
    AgentSkills, AvoidanceAttemptOutcome, AvoidanceChoice, AvoidanceRequest, AvoidanceTicket,
    EncounterAvoidanceNegotiator,
};
pub use control::{SurfaceIntent, TravelControlSurface};
pub use error::{SettingsError, TravelError};
pub use events::{EventJournal, TravelEvent};
pub use headless::{HeadlessAutopilot, HeadlessWorld, HostRecord, WorldChange};
pub use host::{
    AmbientSystems, Autopilot, AutopilotStatus, DestinationResolver, InputHost, Notifier,
    TimeHost, TravelHost, WorldProbe,
};
pub use journey::{Journey, Location, LocationRef, MapSummary, PauseReason, SimTime};
pub use rng::{CountingRng, derive_stream_seed};
pub use settings::{LocationPauseMode, TravelSettings};
pub use signals::{SignalBus, SignalKind, Subscription, WorldSignal};
pub use supervisor::{JourneySupervisor, SupervisorState};
pub use time_scale::{AccelerationLadder, TimeScaleController, TimeScaleState};
