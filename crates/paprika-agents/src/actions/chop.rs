//! `chop`: work a processing surface until it yields a result.
//!
//! The target may be the surface itself or something carrying it (a prep
//! table with a cutting board on top). Each tick runs one processing step;
//! the first non-empty result replaces the surface contents.

use paprika_types::{ActionArgs, ArgError};
use paprika_world::Station;
use tracing::debug;

use super::{
    ActionHandler, ActionName, ActionTask, AgentContext, Deadline, HandlerStatus, check_range,
};

/// Handler for `chop`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChopHandler;

impl ActionHandler for ChopHandler {
    fn name(&self) -> ActionName {
        ActionName::Chop
    }

    fn execute(&self, args: &ActionArgs) -> Box<dyn ActionTask> {
        Box::new(ChopTask {
            target: args.target_name(),
            surface: None,
            deadline: None,
        })
    }
}

/// A running `chop`.
#[derive(Debug)]
pub struct ChopTask {
    target: Result<String, ArgError>,
    surface: Option<String>,
    deadline: Option<Deadline>,
}

impl ChopTask {
    fn locate(&self, ctx: &mut AgentContext<'_>) -> Result<String, String> {
        let name = self.target.as_ref().map_err(ToString::to_string)?;
        let here = ctx.navigator.position();
        let target = ctx.resolve(name)?;
        check_range(
            &target.id,
            target.position.distance(here),
            ctx.settings.process_interaction_distance,
        )?;
        let surface = ctx
            .world
            .find_station(&target.id, Station::is_processor)
            .map(|e| e.name.clone())
            .ok_or_else(|| format!("Target {} cannot process items", target.id))?;
        ctx.navigator.look_at(target.position.with_y(here.y));
        debug!(agent = ctx.agent, surface = %surface, "chopping");
        Ok(surface)
    }
}

impl ActionTask for ChopTask {
    fn tick(&mut self, ctx: &mut AgentContext<'_>) -> HandlerStatus {
        if self.surface.is_none() {
            match self.locate(ctx) {
                Ok(surface) => self.surface = Some(surface),
                Err(message) => return HandlerStatus::Failed(message),
            }
        }
        let Some(surface) = self.surface.as_deref() else {
            return HandlerStatus::failed("Chop target was not located");
        };
        let deadline = self
            .deadline
            .get_or_insert_with(|| Deadline::new(ctx.settings.chop_timeout()));

        let dt = ctx.frame.dt;
        let result = ctx
            .world
            .with_station(surface, |station| {
                station.processor_mut().and_then(|p| p.process(dt))
            })
            .flatten();

        if let Some(result) = result {
            ctx.world.with_station(surface, |station| {
                if let Some(container) = station.container_mut() {
                    container.replace_item(&result);
                }
            });
            return HandlerStatus::succeeded(format!("Chopped into {result}"));
        }
        if deadline.expired(ctx.frame.now) {
            return HandlerStatus::failed("Process failed or timed out");
        }
        HandlerStatus::Running
    }
}
