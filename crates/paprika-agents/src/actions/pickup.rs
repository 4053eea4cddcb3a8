//! `pickup`: take one item from a supply crate or a container.
//!
//! Range is measured to the closest point of the target's collider. A
//! supply dispenses a fresh item (and starts its cooldown); a container
//! hands over what it holds and is left empty.

use paprika_types::{ActionArgs, ArgError};

use super::{ActionHandler, ActionName, ActionTask, AgentContext, HandlerStatus, check_range};

/// Handler for `pickup`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PickupHandler;

impl ActionHandler for PickupHandler {
    fn name(&self) -> ActionName {
        ActionName::Pickup
    }

    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(PickupTask {
            target: args.target_name(),
        })
    }
}

/// A running `pickup`. Completes on its first tick.
#[derive(Debug)]
pub struct PickupTask {
    target: Result<String, ArgError>,
}

impl PickupTask {
    fn run(&self, ctx: &mut AgentContext<'_>) -> Result<String, String> {
        let name = self.target.as_ref().map_err(ToString::to_string)?;
        if let Some(held) = ctx.state.held_item() {
            return Err(format!("Hand is already holding {held}"));
        }

        let here = ctx.navigator.position();
        let target = ctx.resolve(name)?;
        let entity = ctx
            .world
            .get(&target.id)
            .ok_or_else(|| format!("Target '{}' not found", target.id))?;
        let distance = entity.surface_distance(here);
        check_range(&target.id, distance, ctx.settings.interaction_distance)?;
        ctx.navigator.look_at(target.position.with_y(here.y));

        let item = ctx
            .world
            .with_station(&target.id, |station| {
                if let Some(supply) = station.supply_mut() {
                    return supply.dispense().map_err(|err| err.to_string());
                }
                station
                    .container_mut()
                    .ok_or_else(|| format!("Target {} has nothing to pick up", target.id))?
                    .take_item()
                    .ok_or_else(|| format!("Target {} is empty", target.id))
            })
            .ok_or_else(|| format!("Target {} has nothing to pick up", target.id))??;

        ctx.state.set_held_item(&item);
        Ok(format!("Picked up {item} from {}", target.id))
    }
}

impl ActionTask for PickupTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        match self.run(ctx) {
            Ok(message) => HandlerStatus::Succeeded(message),
            Err(message) => HandlerStatus::Failed(message),
        }
    }
}
