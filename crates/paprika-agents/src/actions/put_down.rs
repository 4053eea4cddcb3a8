//! `put_down`: place the held item on a container.

use paprika_types::{ActionArgs, ArgError};
use paprika_world::Station;

use super::{ActionHandler, ActionName, ActionTask, AgentContext, HandlerStatus, check_range};

/// Handler for `put_down`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PutDownHandler;

impl ActionHandler for PutDownHandler {
    fn name(&self) -> ActionName {
        ActionName::PutDown
    }

    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(PutDownTask {
            target: args.target_name(),
        })
    }
}

/// A running `put_down`. Completes on its first tick.
#[derive(Debug)]
pub struct PutDownTask {
    target: Result<String, ArgError>,
}

impl PutDownTask {
    fn run(&self, ctx: &mut AgentContext<'_>) -> Result<String, String> {
        // An empty hand fails before anything else, target resolution included.
        let item = ctx
            .state
            .held_item()
            .map(str::to_owned)
            .ok_or_else(|| "Hand is empty".to_owned())?;
        let name = self.target.as_ref().map_err(ToString::to_string)?;

        let here = ctx.navigator.position();
        let target = ctx.resolve(name)?;
        let entity = ctx
            .world
            .get(&target.id)
            .ok_or_else(|| format!("Target '{}' not found", target.id))?;
        check_range(
            &target.id,
            entity.surface_distance(here),
            ctx.settings.interaction_distance,
        )?;
        ctx.navigator.look_at(target.position.with_y(here.y));

        let holder = ctx
            .world
            .find_station(&target.id, |s: &Station| s.container().is_some())
            .map(|e| e.name.clone())
            .ok_or_else(|| format!("Target {} cannot hold items", target.id))?;
        ctx.world
            .with_station(&holder, |station| match station.container_mut() {
                Some(container) => container
                    .put_item(&item)
                    .map_err(|err| format!("Target refused item: {err}")),
                None => Err(format!("Target {holder} cannot hold items")),
            })
            .ok_or_else(|| format!("Target container {holder} not found"))??;

        ctx.state.take_held_item();
        Ok(format!("Put {item} on {holder}"))
    }
}

impl ActionTask for PutDownTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        match self.run(ctx) {
            Ok(message) => HandlerStatus::Succeeded(message),
            Err(message) => HandlerStatus::Failed(message),
        }
    }
}
