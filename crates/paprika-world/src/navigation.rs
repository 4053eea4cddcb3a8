//! Navigation collaborators.
//!
//! Pathfinding is not modeled here. A [`Navigator`] accepts a destination
//! and reports progress the way a navmesh agent does; a
//! [`WalkableSurface`] snaps arbitrary points onto walkable ground. The
//! [`KinematicNavigator`] and [`FloorPlan`] implementations are enough for
//! an open kitchen floor and for deterministic tests.

use core::time::Duration;

use crate::geometry::Vec3;

/// A movement controller for one agent body.
pub trait Navigator: Send {
    /// Start moving towards `destination`. Path planning completes on a
    /// later tick.
    fn set_destination(&mut self, destination: Vec3);

    /// Cancel movement and clear the path.
    fn stop(&mut self);

    /// Whether a path is still being computed.
    fn path_pending(&self) -> bool;

    /// Remaining distance along the current path.
    fn remaining_distance(&self) -> f32;

    /// Distance at which the navigator considers the destination reached.
    fn stopping_distance(&self) -> f32;

    /// Whether a path is currently set.
    fn has_path(&self) -> bool;

    /// Current velocity.
    fn velocity(&self) -> Vec3;

    /// Current body position.
    fn position(&self) -> Vec3;

    /// Turn the body to face `target`.
    fn look_at(&mut self, target: Vec3);

    /// Advance movement by `dt`.
    fn step(&mut self, dt: Duration);
}

/// Arrival test shared by every movement handler: no pending path, within
/// stopping distance, and either no path left or no velocity.
pub fn has_arrived(navigator: &dyn Navigator) -> bool {
    !navigator.path_pending()
        && navigator.remaining_distance() <= navigator.stopping_distance()
        && (!navigator.has_path() || navigator.velocity().is_near_zero())
}

/// Ground query used to snap destinations.
pub trait WalkableSurface: Send + Sync {
    /// The nearest walkable point within `max_distance` of `point`.
    fn sample(&self, point: Vec3, max_distance: f32) -> Option<Vec3>;
}

/// Straight-line mover with a one-tick path planning delay.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicNavigator {
    position: Vec3,
    destination: Option<Vec3>,
    pending: bool,
    speed: f32,
    stopping_distance: f32,
    velocity: Vec3,
    facing: Vec3,
}

impl KinematicNavigator {
    /// Default walking speed in units per second.
    pub const DEFAULT_SPEED: f32 = 3.5;

    /// Default stopping distance.
    pub const DEFAULT_STOPPING_DISTANCE: f32 = 0.1;

    /// Create a navigator standing at `position`.
    pub const fn new(position: Vec3) -> Self {
        Self {
            position,
            destination: None,
            pending: false,
            speed: Self::DEFAULT_SPEED,
            stopping_distance: Self::DEFAULT_STOPPING_DISTANCE,
            velocity: Vec3::ZERO,
            facing: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    /// Override the walking speed.
    #[must_use]
    pub const fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Current destination, if moving.
    pub const fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    /// Direction the body faces.
    pub const fn facing(&self) -> Vec3 {
        self.facing
    }
}

impl Navigator for KinematicNavigator {
    fn set_destination(&mut self, destination: Vec3) {
        self.destination = Some(destination);
        self.pending = true;
    }

    fn stop(&mut self) {
        self.destination = None;
        self.pending = false;
        self.velocity = Vec3::ZERO;
    }

    fn path_pending(&self) -> bool {
        self.pending
    }

    fn remaining_distance(&self) -> f32 {
        self.destination
            .map_or(0.0, |dest| self.position.distance(dest))
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn has_path(&self) -> bool {
        self.destination.is_some()
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn look_at(&mut self, target: Vec3) {
        let dir = (target - self.position).with_y(0.0).normalized();
        if !dir.is_near_zero() {
            self.facing = dir;
        }
    }

    fn step(&mut self, dt: Duration) {
        if self.pending {
            self.pending = false;
            return;
        }
        let Some(dest) = self.destination else {
            self.velocity = Vec3::ZERO;
            return;
        };
        let secs = dt.as_secs_f32();
        let next = self.position.move_towards(dest, self.speed * secs);
        self.velocity = if secs > 0.0 {
            (next - self.position) * secs.recip()
        } else {
            Vec3::ZERO
        };
        self.position = next;
        if self.position.distance(dest) <= self.stopping_distance {
            self.velocity = Vec3::ZERO;
            self.destination = None;
        } else if !self.velocity.is_near_zero() {
            self.facing = self.velocity.with_y(0.0).normalized();
        }
    }
}

/// A rectangle of walkable floor on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloorRect {
    /// Minimum X.
    pub min_x: f32,
    /// Maximum X.
    pub max_x: f32,
    /// Minimum Z.
    pub min_z: f32,
    /// Maximum Z.
    pub max_z: f32,
}

impl FloorRect {
    /// Closest point of the rectangle to `(x, z)`.
    fn clamp(&self, x: f32, z: f32) -> (f32, f32) {
        (x.clamp(self.min_x, self.max_x), z.clamp(self.min_z, self.max_z))
    }
}

/// Walkable floor made of rectangles at a fixed height.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FloorPlan {
    floor_y: f32,
    rects: Vec<FloorRect>,
}

impl FloorPlan {
    /// Create an empty plan at height `floor_y`.
    pub const fn new(floor_y: f32) -> Self {
        Self {
            floor_y,
            rects: Vec::new(),
        }
    }

    /// Add a walkable rectangle.
    #[must_use]
    pub fn with_rect(mut self, rect: FloorRect) -> Self {
        self.rects.push(rect);
        self
    }
}

impl WalkableSurface for FloorPlan {
    fn sample(&self, point: Vec3, max_distance: f32) -> Option<Vec3> {
        self.rects
            .iter()
            .map(|rect| {
                let (x, z) = rect.clamp(point.x, point.z);
                Vec3::new(x, self.floor_y, z)
            })
            .map(|candidate| (candidate, candidate.distance(point)))
            .filter(|(_, d)| *d <= max_distance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(candidate, _)| candidate)
    }
}
