//! `cook`: wait at an appliance until its contents are ready.
//!
//! The appliance runs its own timer; this handler only polls the ready
//! flag. The finished item stays inside until a later `pickup`.

use paprika_types::{ActionArgs, ArgError};
use paprika_world::{Appliance, Station};

use super::{
    ActionHandler, ActionName, ActionTask, AgentContext, Deadline, HandlerStatus, check_range,
};

/// Handler for `cook`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookHandler;

impl ActionHandler for CookHandler {
    fn name(&self) -> ActionName {
        ActionName::Cook
    }

    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(CookTask {
            target: args.target_name(),
            appliance: None,
            deadline: None,
        })
    }
}

/// A running `cook`.
#[derive(Debug)]
pub struct CookTask {
    target: Result<String, ArgError>,
    appliance: Option<String>,
    deadline: Option<Deadline>,
}

impl CookTask {
    fn locate(&self, ctx: &mut AgentContext<'_>) -> Result<String, String> {
        let name = self.target.as_ref().map_err(ToString::to_string)?;
        let here = ctx.navigator.position();
        let target = ctx.resolve(name)?;
        check_range(
            &target.id,
            target.position.distance(here),
            ctx.settings.process_interaction_distance,
        )?;
        let appliance = ctx
            .world
            .find_station(&target.id, Station::is_appliance)
            .map(|e| e.name.clone())
            .ok_or_else(|| format!("Target {} is not an appliance", target.id))?;
        ctx.navigator.look_at(target.position.with_y(here.y));
        Ok(appliance)
    }
}

impl ActionTask for CookTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        if self.appliance.is_none() {
            match self.locate(ctx) {
                Ok(appliance) => self.appliance = Some(appliance),
                Err(message) => return HandlerStatus::Failed(message),
            }
        }
        let ready = self
            .appliance
            .as_deref()
            .and_then(|name| ctx.world.get(name))
            .and_then(|entity| entity.station.as_ref())
            .and_then(Station::appliance)
            .is_some_and(Appliance::is_ready);
        if ready {
            return HandlerStatus::succeeded("Food is Ready");
        }
        let deadline = self
            .deadline
            .get_or_insert_with(|| Deadline::new(ctx.settings.cook_timeout()));
        if deadline.expired(ctx.frame.now) {
            return HandlerStatus::failed("Cooking Timed out");
        }
        HandlerStatus::Running
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use core::time::Duration;

    use paprika_world::{Counter, Entity, ItemContainer, Oven, Vec3, World};

    use super::super::testing::Fixture;
    use super::*;

    fn kitchen(cook_time: Duration, loaded: bool) -> World {
        let mut oven = Oven::new(&[("meat", "steak")], cook_time);
        if loaded {
            oven.put_item("meat").unwrap();
        }
        let mut world = World::new();
        world
            .insert(
                Entity::new("Oven", Vec3::new(1.0, 0.0, 0.0))
                    .with_collider(0.5)
                    .with_station(Station::Oven(oven)),
            )
            .unwrap();
        world
            .insert(
                Entity::new("Plate", Vec3::new(-1.0, 0.0, 0.0))
                    .with_station(Station::Counter(Counter::new())),
            )
            .unwrap();
        world
    }

    #[test]
    fn cook_waits_for_ready_and_leaves_food_inside() {
        let mut fx = Fixture::new(kitchen(Duration::from_secs(2), true), Vec3::ZERO);
        let mut task = CookHandler.execute(&ActionArgs::new().with("id", "Oven"));
        let (status, frames) = fx.run(task.as_mut(), 500);
        assert_eq!(status, HandlerStatus::succeeded("Food is Ready"));
        assert_eq!(frames, 20);
        assert_eq!(fx.world.get("Oven").unwrap().state_label(), "ready");
    }

    #[test]
    fn cook_times_out_when_appliance_is_slow() {
        let mut fx = Fixture::new(kitchen(Duration::from_secs(45), true), Vec3::ZERO);
        let mut task = CookHandler.execute(&ActionArgs::new().with("id", "Oven"));
        let (status, frames) = fx.run(task.as_mut(), 1000);
        assert_eq!(status, HandlerStatus::failed("Cooking Timed out"));
        assert_eq!(frames, 201);
    }

    #[test]
    fn cook_rejects_non_appliance() {
        let mut fx = Fixture::new(kitchen(Duration::from_secs(2), false), Vec3::ZERO);
        let mut task = CookHandler.execute(&ActionArgs::new().with("id", "Plate"));
        assert_eq!(
            fx.step(task.as_mut()),
            HandlerStatus::failed("Target Plate is not an appliance")
        );
    }

    #[test]
    fn cook_without_target_fails() {
        let mut fx = Fixture::new(kitchen(Duration::from_secs(2), true), Vec3::ZERO);
        let mut task = CookHandler.execute(&ActionArgs::new().with("id", ""));
        let status = fx.step(task.as_mut());
        assert!(matches!(status, HandlerStatus::Failed(ref m) if m.contains("missing argument")));
    }
}
