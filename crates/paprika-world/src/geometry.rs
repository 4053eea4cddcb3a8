//! Minimal 3D vector math for positions and distances.
//!
//! The world is Y-up. Distances are plain Euclidean in all three axes; the
//! arbiter and the handlers never compare floats for equality, only against
//! thresholds.

use core::ops::{Add, Mul, Sub};

use paprika_types::Position;
use serde::{Deserialize, Serialize};

/// A point or direction in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X coordinate.
    pub x: f32,
    /// Y (up) coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Vec3 {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);

    /// Unit vector pointing up.
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    /// Construct a vector from components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Squared length.
    pub fn length_squared(self) -> f32 {
        self.z.mul_add(self.z, self.x.mul_add(self.x, self.y * self.y))
    }

    /// Euclidean length.
    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    /// Distance to another point.
    pub fn distance(self, other: Self) -> f32 {
        (other - self).length()
    }

    /// Whether the vector is shorter than `f32::EPSILON`.
    pub fn is_near_zero(self) -> bool {
        self.length() <= f32::EPSILON
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if len <= f32::EPSILON {
            return Self::ZERO;
        }
        self * len.recip()
    }

    /// Move from `self` towards `target` by at most `max_step`.
    pub fn move_towards(self, target: Self, max_step: f32) -> Self {
        let delta = target - self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            return target;
        }
        self + delta * (max_step / dist)
    }

    /// Same point with the Y component replaced.
    #[must_use]
    pub const fn with_y(self, y: f32) -> Self {
        Self::new(self.x, y, self.z)
    }
}

impl Add for Vec3 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl From<Vec3> for Position {
    fn from(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

impl From<Position> for Vec3 {
    fn from(p: Position) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}
