//! Action handlers as explicit, tick-driven state machines.
//!
//! An [`ActionHandler`] is the registered capability for one action kind.
//! Executing it does no work by itself: it returns an [`ActionTask`] that
//! the owner ticks once per simulation frame until it yields a terminal
//! [`HandlerStatus`]. No handler ever blocks; every wait is "return
//! [`HandlerStatus::Running`] and look again next tick", bounded by a
//! handler-local timeout.
//!
//! # Submodules
//!
//! - [`chop`] -- Process the contents of a cutting board.
//! - [`cook`] -- Wait for an appliance to finish.
//! - [`navigate`] -- Walk to a named station or a coordinate.
//! - [`pickup`] -- Take an item from a supply or a surface.
//! - [`put_down`] -- Place the held item on a container.
//! - [`travel`] -- Arrival polling shared by the movement handlers.
//! - [`wander`] -- Walk to a random nearby point.

pub mod chop;
pub mod cook;
pub mod navigate;
pub mod pickup;
pub mod put_down;
pub mod travel;
pub mod wander;

use core::str::FromStr;
use core::time::Duration;

use paprika_types::{ActionArgs, ActionStatus};
use paprika_world::{Navigator, Vec3, WalkableSurface, World};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::arbiter::{ResolvedTarget, ResourceArbiter};
use crate::error::UnknownAction;
use crate::settings::ActionSettings;
use crate::state::{ActionTicket, AgentState};

/// Every action kind the planner may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    /// Walk to a station or coordinate (`move_to`).
    MoveTo,
    /// Walk somewhere random nearby.
    Wander,
    /// Take an item.
    Pickup,
    /// Place the held item.
    PutDown,
    /// Slice the contents of a cutting board.
    Chop,
    /// Wait for an appliance.
    Cook,
}

impl ActionName {
    /// All action kinds, in registration order.
    pub const ALL: [Self; 6] = [
        Self::MoveTo,
        Self::Wander,
        Self::Pickup,
        Self::PutDown,
        Self::Chop,
        Self::Cook,
    ];

    /// Wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveTo => "move_to",
            Self::Wander => "wander",
            Self::Pickup => "pickup",
            Self::PutDown => "put_down",
            Self::Chop => "chop",
            Self::Cook => "cook",
        }
    }
}

impl core::fmt::Display for ActionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionName {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| UnknownAction(s.to_owned()))
    }
}

/// Result of one tick of an action task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerStatus {
    /// Still working; tick again next frame.
    Running,
    /// Finished successfully with a message for the planner.
    Succeeded(String),
    /// Finished unsuccessfully with a diagnostic message.
    Failed(String),
}

impl HandlerStatus {
    /// Shorthand for a failure.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Shorthand for a success.
    pub fn succeeded(message: impl Into<String>) -> Self {
        Self::Succeeded(message.into())
    }

    /// Whether this status ends the task.
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Running)
    }
}

/// Timing of the current simulation frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frame {
    /// Frame counter.
    pub tick: u64,
    /// Simulated time since start.
    pub now: Duration,
    /// Time elapsed since the previous frame.
    pub dt: Duration,
}

/// Everything a task may read or mutate during one tick.
///
/// Passed explicitly into every call so tests can build isolated fixtures.
pub struct AgentContext<'a> {
    /// Name of the agent's own body entity.
    pub agent: &'a str,
    /// The agent state store.
    pub state: &'a mut AgentState,
    /// The shared world.
    pub world: &'a mut World,
    /// Movement controller.
    pub navigator: &'a mut dyn Navigator,
    /// Ground query.
    pub walkable: &'a dyn WalkableSurface,
    /// Random source for wandering.
    pub rng: &'a mut StdRng,
    /// Target resolver.
    pub arbiter: &'a ResourceArbiter,
    /// Handler tunables.
    pub settings: &'a ActionSettings,
    /// Current frame timing.
    pub frame: Frame,
}

impl AgentContext<'_> {
    /// Resolve the planner's target for this agent's current position.
    ///
    /// # Errors
    ///
    /// Returns the resolution failure rendered as a handler message.
    pub fn resolve(&self, identifier: &str) -> Result<ResolvedTarget, String> {
        self.arbiter
            .resolve(&*self.world, identifier, self.navigator.position())
            .map_err(|err| err.to_string())
    }
}

/// The registered capability for one action kind.
pub trait ActionHandler: Send + Sync {
    /// The action name this handler serves.
    fn name(&self) -> ActionName;

    /// Start an invocation. Argument problems surface on the first tick.
    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask>;
}

/// One running invocation of a handler.
pub trait ActionTask: Send {
    /// Advance by one frame.
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus;
}

/// A handler-local timeout that starts on the first check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline {
    started: Option<Duration>,
    limit: Duration,
}

impl Deadline {
    /// A deadline `limit` after the first call to [`Deadline::expired`].
    pub const fn new(limit: Duration) -> Self {
        Self {
            started: None,
            limit,
        }
    }

    /// Whether `limit` has elapsed since the first check.
    pub fn expired(&mut self, now: Duration) -> bool {
        let started = *self.started.get_or_insert(now);
        now.saturating_sub(started) >= self.limit
    }
}

/// Fail unless `distance` is within `limit`.
pub(crate) fn check_range(target: &str, distance: f32, limit: f32) -> Result<(), String> {
    if distance > limit {
        return Err(format!(
            "Target {target} is too far ({distance:.1}m > {limit:.1}m), move closer first"
        ));
    }
    Ok(())
}

/// A dispatched task together with the ticket it reports under.
///
/// Guarantees exactly one report: once the task returns a terminal status
/// it is never ticked again.
pub struct InFlightAction {
    ticket: ActionTicket,
    name: ActionName,
    task: Box<dyn ActionTask>,
    finished: bool,
    detached: bool,
}

impl core::fmt::Debug for InFlightAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("InFlightAction")
            .field("ticket", &self.ticket)
            .field("name", &self.name)
            .field("finished", &self.finished)
            .field("detached", &self.detached)
            .finish_non_exhaustive()
    }
}

impl InFlightAction {
    /// Wrap a freshly dispatched task.
    pub fn new(ticket: ActionTicket, name: ActionName, task: Box<dyn ActionTask>) -> Self {
        Self {
            ticket,
            name,
            task,
            finished: false,
            detached: false,
        }
    }

    /// Cut the task off from the body.
    ///
    /// A detached task keeps ticking until it reports, but sees a read-only
    /// navigator: it can no longer move, stop or turn the agent.
    pub const fn detach(&mut self) {
        self.detached = true;
    }

    /// Whether the task was cut off from the body.
    pub const fn is_detached(&self) -> bool {
        self.detached
    }

    /// The ticket this action reports under.
    pub const fn ticket(&self) -> ActionTicket {
        self.ticket
    }

    /// The action kind.
    pub const fn name(&self) -> ActionName {
        self.name
    }

    /// Whether the task already reported.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Tick the task and report a terminal status to the state store.
    ///
    /// Returns `true` once the task has finished.
    pub fn poll(&mut self, ctx: &mut AgentContext<'_>) -> bool {
        if self.finished {
            return true;
        }
        let status = if self.detached {
            let mut parked = ParkedNavigator::observe(&*ctx.navigator);
            self.task.tick(&mut AgentContext {
                agent: ctx.agent,
                state: &mut *ctx.state,
                world: &mut *ctx.world,
                navigator: &mut parked,
                walkable: ctx.walkable,
                rng: &mut *ctx.rng,
                arbiter: ctx.arbiter,
                settings: ctx.settings,
                frame: ctx.frame,
            })
        } else {
            self.task.tick(ctx)
        };
        let (status, message) = match status {
            HandlerStatus::Running => return false,
            HandlerStatus::Succeeded(message) => {
                info!(action = %self.name, ticket = %self.ticket, result = %message, "action succeeded");
                (ActionStatus::Success, message)
            }
            HandlerStatus::Failed(message) => {
                warn!(action = %self.name, ticket = %self.ticket, error = %message, "action failed");
                (ActionStatus::Failure, message)
            }
        };
        self.finished = true;
        ctx.state.report(self.ticket, status, &message);
        true
    }
}

/// What a detached task sees of the body: the current motion state,
/// with every command ignored.
#[derive(Debug, Clone, Copy)]
struct ParkedNavigator {
    position: Vec3,
    velocity: Vec3,
    path_pending: bool,
    remaining_distance: f32,
    stopping_distance: f32,
    has_path: bool,
}

impl ParkedNavigator {
    fn observe(navigator: &dyn Navigator) -> Self {
        Self {
            position: navigator.position(),
            velocity: navigator.velocity(),
            path_pending: navigator.path_pending(),
            remaining_distance: navigator.remaining_distance(),
            stopping_distance: navigator.stopping_distance(),
            has_path: navigator.has_path(),
        }
    }
}

impl Navigator for ParkedNavigator {
    fn set_destination(&mut self, _destination: Vec3) {}

    fn stop(&mut self) {}

    fn path_pending(&self) -> bool {
        self.path_pending
    }

    fn remaining_distance(&self) -> f32 {
        self.remaining_distance
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn has_path(&self) -> bool {
        self.has_path
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn look_at(&mut self, _target: Vec3) {}

    fn step(&mut self, _dt: Duration) {}
}
