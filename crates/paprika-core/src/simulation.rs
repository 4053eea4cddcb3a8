//! Single-agent simulation: the clock, the world and the agent living in it.
//!
//! One call to [`Simulation::step`] is one frame: advance the clock, run
//! every station timer, then tick the agent.

use core::time::Duration;

use paprika_types::{Perception, Plan};
use paprika_world::{KinematicNavigator, World, create_starting_kitchen};

use crate::agent::{Agent, DEFAULT_AGENT_NAME};
use crate::clock::SimClock;
use crate::config::AgentConfig;
use crate::error::CoreError;
use crate::executor::{PlanError, PlanReport};

/// A world with one agent, driven frame by frame.
#[derive(Debug)]
pub struct Simulation {
    clock: SimClock,
    world: World,
    agent: Agent,
}

impl Simulation {
    /// The starting kitchen with one agent at its spawn point.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError`] if the clock interval is zero or the kitchen
    /// cannot be built.
    pub fn starting_kitchen(config: &AgentConfig) -> Result<Self, CoreError> {
        let kitchen = create_starting_kitchen()?;
        let mut world = kitchen.world;
        let agent = Agent::spawn(
            DEFAULT_AGENT_NAME,
            &mut world,
            Box::new(KinematicNavigator::new(kitchen.agent_spawn)),
            Box::new(kitchen.floor),
            config,
        )?;
        let clock = SimClock::new(config.tick.interval())?;
        Ok(Self::from_parts(clock, world, agent))
    }

    /// Assemble a simulation from prepared parts.
    pub const fn from_parts(clock: SimClock, world: World, agent: Agent) -> Self {
        Self {
            clock,
            world,
            agent,
        }
    }

    /// Advance one frame.
    ///
    /// Returns the plan report on the frame a plan finishes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Clock`] if the clock overflows.
    pub fn step(&mut self) -> Result<Option<PlanReport>, CoreError> {
        let frame = self.clock.advance()?;
        self.world.advance(frame.dt);
        Ok(self.agent.tick(&mut self.world, frame))
    }

    /// Step until a plan finishes or `limit` of simulated time passes.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Clock`] if the clock overflows.
    pub fn run_for(&mut self, limit: Duration) -> Result<Option<PlanReport>, CoreError> {
        let deadline = self.clock.now().saturating_add(limit);
        while self.clock.now() < deadline {
            if let Some(report) = self.step()? {
                return Ok(Some(report));
            }
        }
        Ok(None)
    }

    /// Hand a plan to the agent.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::Busy`] if a plan is already executing.
    pub fn start_plan(&mut self, plan: Plan) -> Result<(), PlanError> {
        self.agent.start_plan(plan)
    }

    /// What the agent currently perceives.
    pub fn perceive(&self, hour: u32) -> Perception {
        self.agent.perceive(&self.world, hour)
    }

    /// The clock.
    pub const fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// The world.
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access, for scripted setup.
    pub const fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// The agent.
    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Mutable agent access.
    pub const fn agent_mut(&mut self) -> &mut Agent {
        &mut self.agent
    }
}
