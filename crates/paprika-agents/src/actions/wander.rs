//! `wander`: walk to a random walkable point nearby. Always succeeds.

use core::f32::consts::TAU;

use paprika_types::ActionArgs;
use paprika_world::Vec3;
use rand::Rng;
use tracing::debug;

use super::travel::{Travel, TravelStatus};
use super::{ActionHandler, ActionName, ActionTask, AgentContext, HandlerStatus};

const WANDER_COMPLETE: &str = "Wander complete";

/// Handler for `wander`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WanderHandler;

impl ActionHandler for WanderHandler {
    fn name(&self) -> ActionName {
        ActionName::Wander
    }

    fn execute(&self, _args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(WanderTask { travel: None })
    }
}

/// A running `wander`.
#[derive(Debug)]
pub struct WanderTask {
    travel: Option<Travel>,
}

/// Pick a random point in the wander disc that lies on walkable ground,
/// or the current position if every attempt misses.
fn pick_destination(ctx: &mut AgentContext<'_>) -> Vec3 {
    let origin = ctx.navigator.position();
    let radius = ctx.settings.wander_radius;
    let snap = ctx.settings.ground_snap_radius;
    for attempt in 0..ctx.settings.wander_attempts {
        let angle = ctx.rng.random_range(0.0..TAU);
        let dist = radius * ctx.rng.random_range(0.0_f32..=1.0).sqrt();
        let candidate = origin + Vec3::new(angle.cos() * dist, 0.0, angle.sin() * dist);
        if let Some(point) = ctx.walkable.sample(candidate, snap) {
            debug!(attempt, x = point.x, z = point.z, "wander destination chosen");
            return point;
        }
    }
    debug!("no walkable wander destination, staying put");
    origin
}

impl ActionTask for WanderTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        let Some(travel) = self.travel.as_mut() else {
            let destination = pick_destination(ctx);
            let timeout = ctx.settings.wander_timeout();
            self.travel = Some(Travel::start(ctx, destination, timeout));
            return HandlerStatus::Running;
        };
        match travel.poll(ctx) {
            TravelStatus::Moving => HandlerStatus::Running,
            TravelStatus::Arrived | TravelStatus::TimedOut => {
                HandlerStatus::succeeded(WANDER_COMPLETE)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use paprika_world::{FloorPlan, FloorRect, KinematicNavigator, Navigator, World};

    use super::super::testing::Fixture;
    use super::*;

    #[test]
    fn wander_stays_within_radius() {
        let mut fx = Fixture::new(World::new(), Vec3::ZERO);
        let mut task = WanderHandler.execute(&ActionArgs::new());
        let (status, _) = fx.run(task.as_mut(), 200);
        assert_eq!(status, HandlerStatus::succeeded(WANDER_COMPLETE));
        assert!(fx.navigator.position().distance(Vec3::ZERO) <= 3.0 + 0.1);
    }

    #[test]
    fn wander_falls_back_to_current_position() {
        let mut fx = Fixture::new(World::new(), Vec3::ZERO);
        fx.floor = FloorPlan::new(0.0).with_rect(FloorRect {
            min_x: 50.0,
            max_x: 60.0,
            min_z: 50.0,
            max_z: 60.0,
        });
        let mut task = WanderHandler.execute(&ActionArgs::new());
        let (status, _) = fx.run(task.as_mut(), 50);
        assert_eq!(status, HandlerStatus::succeeded(WANDER_COMPLETE));
        assert!(fx.navigator.position().is_near_zero());
    }

    #[test]
    fn wander_succeeds_even_when_stuck() {
        let mut fx = Fixture::new(World::new(), Vec3::ZERO);
        fx.navigator = KinematicNavigator::new(Vec3::ZERO).with_speed(0.0);
        let mut task = WanderHandler.execute(&ActionArgs::new());
        let (status, frames) = fx.run(task.as_mut(), 500);
        assert_eq!(status, HandlerStatus::succeeded(WANDER_COMPLETE));
        assert!(frames <= 101);
    }
}
