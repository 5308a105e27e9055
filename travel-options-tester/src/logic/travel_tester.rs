use std::cell::RefCell;
use std::hash::Hasher;
use std::rc::Rc;
use std::sync::Arc;

use anyhow::{Context, Result};
use travel_options::{
    AgentSkills, AvoidanceChoice, HeadlessWorld, HostRecord, JourneySupervisor, MapSummary,
    PauseReason, SignalBus, SignalKind, SupervisorState, TravelEvent, TravelSettings, WorldChange,
};
use twox_hash::XxHash64;

pub const DESTINATION: MapSummary = MapSummary::new(17, 4);
pub const DESTINATION_NAME: &str = "Wayrest";
const DEFAULT_ROUTE_STEPS: u32 = 12;
const DEFAULT_MAX_TICKS: u32 = 200;

const ALL_SIGNAL_KINDS: [SignalKind; 4] = [
    SignalKind::EnterLocation,
    SignalKind::Encounter,
    SignalKind::SessionLoaded,
    SignalKind::NewSession,
];

/// Input a simulated user gives the control surface before a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Faster,
    Slower,
    Close,
    Cancel,
    Interrupt,
}

/// A scripted journey plus the checks its outcome must pass.
#[derive(Debug, Clone)]
pub struct TravelPlan {
    pub settings: TravelSettings,
    pub cautious: bool,
    pub route_steps: u32,
    pub skills: AgentSkills,
    pub script: Vec<(u32, WorldChange)>,
    pub actions: Vec<(u32, UserAction)>,
    pub avoidance_choice: AvoidanceChoice,
    pub max_ticks: u32,
    pub replay_check: bool,
    pub expectations: Vec<TravelExpectation>,
}

impl Default for TravelPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl TravelPlan {
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: TravelSettings::default_config(),
            cautious: false,
            route_steps: DEFAULT_ROUTE_STEPS,
            skills: AgentSkills::default(),
            script: Vec::new(),
            actions: Vec::new(),
            avoidance_choice: AvoidanceChoice::Attempt,
            max_ticks: DEFAULT_MAX_TICKS,
            replay_check: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: TravelSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub const fn cautious(mut self) -> Self {
        self.cautious = true;
        self
    }

    #[must_use]
    pub const fn with_route_steps(mut self, steps: u32) -> Self {
        self.route_steps = steps;
        self
    }

    #[must_use]
    pub const fn with_skills(mut self, skills: AgentSkills) -> Self {
        self.skills = skills;
        self
    }

    #[must_use]
    pub fn at_step(mut self, step: u32, change: WorldChange) -> Self {
        self.script.push((step, change));
        self
    }

    #[must_use]
    pub fn before_tick(mut self, tick: u32, action: UserAction) -> Self {
        self.actions.push((tick, action));
        self
    }

    #[must_use]
    pub const fn answering(mut self, choice: AvoidanceChoice) -> Self {
        self.avoidance_choice = choice;
        self
    }

    #[must_use]
    pub const fn with_replay_check(mut self) -> Self {
        self.replay_check = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<TravelExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a journey completes.
type TravelExpectationFn = Arc<dyn Fn(&RunSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct TravelExpectation(TravelExpectationFn);

impl std::fmt::Debug for TravelExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TravelExpectation").finish()
    }
}

impl TravelExpectation {
    pub fn evaluate(&self, summary: &RunSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for TravelExpectation
where
    F: Fn(&RunSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of one supervised journey.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub seed: u64,
    pub ticks: u32,
    pub state: SupervisorState,
    pub last_reason: PauseReason,
    pub destination_retained: bool,
    pub negotiations: u32,
    pub rng_draws: u64,
    /// Host clock readings at the end of the run, before shutdown.
    pub time_scale: f64,
    pub fixed_step: f64,
    pub baseline_fixed_step: f64,
    pub events: Vec<TravelEvent>,
    pub record: HostRecord,
    pub leaked_subscriptions: usize,
    pub restored_after_shutdown: bool,
    pub digest: u64,
    pub replay_digest: Option<u64>,
}

impl RunSummary {
    #[must_use]
    pub fn arrived(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, TravelEvent::Arrived { .. }))
    }

    #[must_use]
    pub fn avoidance_results(&self) -> Vec<bool> {
        self.events
            .iter()
            .filter_map(|event| match event {
                TravelEvent::AvoidanceResolved { outcome, .. } => Some(outcome.succeeded),
                _ => None,
            })
            .collect()
    }
}

/// Headless deterministic runner for supervised journeys.
#[derive(Debug, Clone, Copy)]
pub struct TravelTester {
    verbose: bool,
}

impl TravelTester {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Run `plan` once, and a second time when it asks for a replay check.
    pub fn run_plan(&self, plan: &TravelPlan, seed: u64) -> Result<RunSummary> {
        let mut summary = self.run_once(plan, seed)?;
        if plan.replay_check {
            let replay = self.run_once(plan, seed)?;
            summary.replay_digest = Some(replay.digest);
        }
        Ok(summary)
    }

    fn run_once(&self, plan: &TravelPlan, seed: u64) -> Result<RunSummary> {
        let bus = Rc::new(RefCell::new(SignalBus::new()));
        let world = build_world(plan, Rc::clone(&bus));
        let mut supervisor =
            JourneySupervisor::with_bus(world, plan.settings.clone(), seed, Rc::clone(&bus))
                .context("supervisor settings rejected")?;
        supervisor
            .begin_travel(DESTINATION, plan.cautious)
            .context("could not begin travel")?;

        let mut ticks = 0;
        let mut negotiations = 0;
        for tick in 1..=plan.max_ticks {
            ticks = tick;
            for &(_, action) in plan.actions.iter().filter(|(at, _)| *at == tick) {
                apply_action(&mut supervisor, action);
            }
            supervisor.tick();
            if let SupervisorState::Negotiating { ticket } = supervisor.state() {
                negotiations += 1;
                supervisor.resolve_avoidance(ticket, plan.avoidance_choice)?;
            }
            if !supervisor.is_travelling() {
                break;
            }
        }

        if self.verbose {
            println!(
                "    seed {seed}: {ticks} ticks, state {:?}, reason {}",
                supervisor.state(),
                supervisor.last_reason().key()
            );
        }

        let state = supervisor.state();
        let last_reason = supervisor.last_reason();
        let destination_retained = supervisor.journey().is_some();
        let rng_draws = supervisor.rng_draws();
        let time_scale = supervisor.host().time_scale();
        let fixed_step = supervisor.host().fixed_step();
        let baseline_fixed_step = supervisor.settings().baseline_fixed_step;
        let events = supervisor.drain_events();

        let world = supervisor.shutdown();
        let leaked_subscriptions = {
            let bus = bus.borrow();
            ALL_SIGNAL_KINDS
                .iter()
                .map(|kind| bus.subscriber_count(*kind))
                .sum()
        };
        let ambient = world.ambient();
        let restored_after_shutdown = (world.time_scale() - 1.0).abs() < f64::EPSILON
            && world.fixed_step().to_bits() == baseline_fixed_step.to_bits()
            && ambient.player_weather
            && ambient.footsteps
            && ambient.transport_audio;

        let journal = serde_json::to_vec(&events)?;
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&journal);

        Ok(RunSummary {
            seed,
            ticks,
            state,
            last_reason,
            destination_retained,
            negotiations,
            rng_draws,
            time_scale,
            fixed_step,
            baseline_fixed_step,
            events,
            record: world.record().clone(),
            leaked_subscriptions,
            restored_after_shutdown,
            digest: hasher.finish(),
            replay_digest: None,
        })
    }
}

fn build_world(plan: &TravelPlan, bus: Rc<RefCell<SignalBus>>) -> HeadlessWorld {
    let mut world = HeadlessWorld::new()
        .with_destination(DESTINATION, DESTINATION_NAME, "city")
        .with_route_steps(plan.route_steps)
        .with_skills(plan.skills);
    for module in &plan.settings.external_toggles {
        world = world.with_module(module);
    }
    for (step, change) in &plan.script {
        world.schedule(*step, change.clone());
    }
    world.attach_bus(bus);
    world
}

fn apply_action(supervisor: &mut JourneySupervisor<HeadlessWorld>, action: UserAction) {
    match action {
        UserAction::Faster => supervisor.surface().borrow_mut().faster(),
        UserAction::Slower => supervisor.surface().borrow_mut().slower(),
        UserAction::Close => supervisor.surface().borrow_mut().close(),
        UserAction::Cancel => supervisor.surface().borrow_mut().cancel(),
        UserAction::Interrupt => supervisor.interrupt_travel(),
    }
}

/// Checks every journey must pass regardless of scenario.
pub fn hygiene_expectation(summary: &RunSummary) -> Result<()> {
    anyhow::ensure!(
        summary.leaked_subscriptions == 0,
        "{} subscriptions outlived the supervisor",
        summary.leaked_subscriptions
    );
    anyhow::ensure!(
        summary.restored_after_shutdown,
        "host clock or ambient systems were not restored on shutdown"
    );
    if !matches!(summary.state, SupervisorState::Travelling) {
        anyhow::ensure!(
            (summary.time_scale - 1.0).abs() < f64::EPSILON,
            "time scale {} left accelerated while {:?}",
            summary.time_scale,
            summary.state
        );
        anyhow::ensure!(
            summary.fixed_step.to_bits() == summary.baseline_fixed_step.to_bits(),
            "fixed step {} drifted from baseline {}",
            summary.fixed_step,
            summary.baseline_fixed_step
        );
    }
    Ok(())
}
