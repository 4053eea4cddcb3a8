//! `move_to`: walk to a named station or an explicit coordinate.
//!
//! Named targets go through the arbiter, so `PrepTable` walks to the
//! nearest free prep table. A station's stand point is preferred over its
//! centre. The destination is snapped onto walkable ground before the
//! navigator is commanded.

use paprika_types::{ActionArgs, ArgError};
use paprika_world::Vec3;
use tracing::info;

use super::travel::{Travel, TravelStatus, snap_to_ground};
use super::{ActionHandler, ActionName, ActionTask, AgentContext, HandlerStatus};

/// Where the planner wants the agent to go.
#[derive(Debug, Clone, PartialEq)]
enum Goal {
    Named(String),
    Point(Vec3),
}

#[allow(clippy::cast_possible_truncation)]
fn parse_goal(args: &ActionArgs) -> Result<Goal, String> {
    match args.target_name() {
        Ok(name) => return Ok(Goal::Named(name)),
        Err(ArgError::Missing { .. }) => {}
        Err(err) => return Err(err.to_string()),
    }
    match args.coordinate() {
        Ok(Some([x, y, z])) => Ok(Goal::Point(Vec3::new(x as f32, y as f32, z as f32))),
        Ok(None) => Err("Missing target: expected 'id', 'name' or coordinates".to_owned()),
        Err(err) => Err(err.to_string()),
    }
}

/// Handler for `move_to`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavigateHandler;

impl ActionHandler for NavigateHandler {
    fn name(&self) -> ActionName {
        ActionName::MoveTo
    }

    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(NavigateTask {
            goal: Some(parse_goal(args)),
            travel: None,
        })
    }
}

/// A running `move_to`.
#[derive(Debug)]
pub struct NavigateTask {
    goal: Option<Result<Goal, String>>,
    travel: Option<(Travel, String)>,
}

impl NavigateTask {
    fn begin(ctx: &mut AgentContext<'_>, goal: Goal) -> Result<(Travel, String), String> {
        let (label, raw) = match goal {
            Goal::Named(name) => {
                let target = ctx.resolve(&name)?;
                let stand = ctx
                    .world
                    .get(&target.id)
                    .and_then(|entity| entity.stand_point)
                    .unwrap_or(target.position);
                (target.id, stand)
            }
            Goal::Point(point) => (
                format!("({:.1}, {:.1}, {:.1})", point.x, point.y, point.z),
                point,
            ),
        };
        let destination = snap_to_ground(ctx, raw);
        info!(
            agent = ctx.agent,
            target = %label,
            x = destination.x,
            z = destination.z,
            "navigating"
        );
        let timeout = ctx.settings.navigate_timeout();
        Ok((Travel::start(ctx, destination, timeout), label))
    }
}

impl ActionTask for NavigateTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        if let Some(goal) = self.goal.take() {
            match goal.and_then(|goal| Self::begin(ctx, goal)) {
                Ok(travel) => self.travel = Some(travel),
                Err(message) => return HandlerStatus::Failed(message),
            }
            return HandlerStatus::Running;
        }
        let Some((travel, label)) = self.travel.as_mut() else {
            return HandlerStatus::failed("Navigation was not started");
        };
        match travel.poll(ctx) {
            TravelStatus::Moving => HandlerStatus::Running,
            TravelStatus::Arrived => HandlerStatus::succeeded(format!("Arrived at {label}")),
            TravelStatus::TimedOut => HandlerStatus::failed(format!(
                "Navigation to {label} timed out after {}s",
                ctx.settings.navigate_timeout().as_secs()
            )),
        }
    }
}
