//! Arrival polling shared by `move_to` and `wander`.

use core::time::Duration;

use paprika_world::{Vec3, has_arrived};
use tracing::warn;

use super::{AgentContext, Deadline};

/// Progress of a [`Travel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelStatus {
    /// Still walking (or waiting for the path).
    Moving,
    /// Reached the destination.
    Arrived,
    /// The timeout elapsed first.
    TimedOut,
}

/// One walk to a destination with a bounded duration.
///
/// The first poll after [`Travel::start`] only waits, giving the navigator
/// one tick to plan its path. The navigator is stopped before any terminal
/// status is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Travel {
    deadline: Deadline,
    planned: bool,
}

impl Travel {
    /// Command the navigator towards `destination`.
    pub fn start(ctx: &mut AgentContext<'_>, destination: Vec3, timeout: Duration) -> Self {
        ctx.navigator.set_destination(destination);
        let mut deadline = Deadline::new(timeout);
        let _ = deadline.expired(ctx.frame.now);
        Self {
            deadline,
            planned: false,
        }
    }

    /// Check for arrival or timeout.
    pub fn poll(&mut self, ctx: &mut AgentContext<'_>) -> TravelStatus {
        if self.deadline.expired(ctx.frame.now) {
            ctx.navigator.stop();
            return TravelStatus::TimedOut;
        }
        if !self.planned {
            self.planned = true;
            return TravelStatus::Moving;
        }
        if has_arrived(&*ctx.navigator) {
            ctx.navigator.stop();
            return TravelStatus::Arrived;
        }
        TravelStatus::Moving
    }
}

/// Snap `point` onto walkable ground, falling back to the raw point.
pub fn snap_to_ground(ctx: &AgentContext<'_>, point: Vec3) -> Vec3 {
    let radius = ctx.settings.ground_snap_radius;
    ctx.walkable.sample(point, radius).unwrap_or_else(|| {
        warn!(
            x = point.x,
            y = point.y,
            z = point.z,
            radius,
            "no walkable ground near destination, using raw point"
        );
        point
    })
}
