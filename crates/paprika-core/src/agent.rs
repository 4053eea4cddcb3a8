//! The agent aggregate: one body in the world with its state store,
//! handlers, executor and perception.
//!
//! Each tick the agent moves its body, mirrors the new position into the
//! shared world, refreshes its room from the zone it stands in, and then
//! lets the executor advance the current plan.

use paprika_agents::{
    ActionRegistry, ActionSettings, AgentContext, AgentState, Frame, ResourceArbiter,
};
use paprika_types::{Perception, Plan};
use paprika_world::{Entity, Navigator, Tag, Vec3, WalkableSurface, World};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::config::AgentConfig;
use crate::error::CoreError;
use crate::executor::{LogThoughts, PlanError, PlanExecutor, PlanReport, ThoughtSink};
use crate::perception::PerceptionBuilder;

/// Default name of the agent's body entity.
pub const DEFAULT_AGENT_NAME: &str = "Paprika";

/// Collider radius of the agent's body.
const BODY_RADIUS: f32 = 0.3;

/// One kitchen agent.
pub struct Agent {
    name: String,
    state: AgentState,
    navigator: Box<dyn Navigator>,
    walkable: Box<dyn WalkableSurface>,
    rng: StdRng,
    arbiter: ResourceArbiter,
    settings: ActionSettings,
    registry: ActionRegistry,
    executor: PlanExecutor,
    perception: PerceptionBuilder,
    thoughts: Box<dyn ThoughtSink + Send>,
}

impl core::fmt::Debug for Agent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("position", &self.navigator.position())
            .field("executor", &self.executor)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Spawn an agent body named `name` into `world`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::World`] if the name is taken, or
    /// [`CoreError::Registry`] if the handler set is inconsistent.
    pub fn spawn(
        name: &str,
        world: &mut World,
        navigator: Box<dyn Navigator>,
        walkable: Box<dyn WalkableSurface>,
        config: &AgentConfig,
    ) -> Result<Self, CoreError> {
        let position = navigator.position();
        world.insert(
            Entity::new(name, position)
                .with_collider(BODY_RADIUS)
                .with_tag(Tag::Agent),
        )?;
        let registry = ActionRegistry::with_default_handlers()?;
        info!(agent = name, x = position.x, z = position.z, "agent spawned");

        let mut agent = Self {
            name: name.to_owned(),
            state: AgentState::new(),
            navigator,
            walkable,
            rng: StdRng::seed_from_u64(config.world.seed),
            arbiter: ResourceArbiter::new(config.arbiter),
            settings: config.actions,
            registry,
            executor: PlanExecutor::new(config.executor),
            perception: PerceptionBuilder::new(&config.perception),
            thoughts: Box::new(LogThoughts),
        };
        agent.refresh_location(world);
        Ok(agent)
    }

    /// Replace the sink that receives step rationales.
    #[must_use]
    pub fn with_thoughts(mut self, thoughts: Box<dyn ThoughtSink + Send>) -> Self {
        self.thoughts = thoughts;
        self
    }

    /// Name of the body entity.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The agent state store.
    pub const fn state(&self) -> &AgentState {
        &self.state
    }

    /// Current body position.
    pub fn position(&self) -> Vec3 {
        self.navigator.position()
    }

    /// The handler registry.
    pub const fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Whether a plan is executing.
    pub const fn is_executing(&self) -> bool {
        self.executor.is_executing()
    }

    /// Hand a plan to the executor.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Busy`] if a plan is already executing.
    pub fn start_plan(&mut self, plan: Plan) -> Result<(), PlanError> {
        self.executor.start(plan)
    }

    /// Drop the executing plan, if any. A body still walking for the
    /// plan stops where it is.
    pub fn abandon_plan(&mut self) {
        self.executor
            .abandon(&mut self.state, self.navigator.as_mut());
    }

    /// Snapshot what the agent currently perceives.
    pub fn perceive(&self, world: &World, hour: u32) -> Perception {
        self.perception
            .build(world, self.navigator.position(), &self.state, hour)
    }

    /// Advance the agent by one frame.
    ///
    /// Station timers are not advanced here; the caller advances the world
    /// once per frame for every agent.
    pub fn tick(&mut self, world: &mut World, frame: Frame) -> Option<PlanReport> {
        self.navigator.step(frame.dt);
        if let Err(err) = world.set_position(&self.name, self.navigator.position()) {
            warn!(agent = %self.name, error = %err, "agent body missing from world");
        }
        self.refresh_location(world);

        let mut ctx = AgentContext {
            agent: &self.name,
            state: &mut self.state,
            world,
            navigator: self.navigator.as_mut(),
            walkable: self.walkable.as_ref(),
            rng: &mut self.rng,
            arbiter: &self.arbiter,
            settings: &self.settings,
            frame,
        };
        self.executor
            .tick(&mut ctx, &self.registry, self.thoughts.as_mut())
    }

    fn refresh_location(&mut self, world: &World) {
        if let Some(zone) = world.zone_at(self.navigator.position()) {
            self.state.set_location(&zone.name);
        }
    }
}
