//! The physical kitchen as seen by the Paprika agent core.
//!
//! Rendering, physics and pathfinding live elsewhere. This crate models
//! only what decision execution needs to observe and mutate: named
//! entities with structural conventions, station capabilities, room zones,
//! and the opaque navigation collaborators.
//!
//! # Modules
//!
//! - [`entity`] -- [`Entity`] with item holders, interaction points, stand
//!   points, colliders and tags.
//! - [`error`] -- Error types for world-index operations.
//! - [`geometry`] -- [`Vec3`] math.
//! - [`navigation`] -- [`Navigator`] and [`WalkableSurface`] traits with
//!   kinematic and floor-plan implementations.
//! - [`station`] -- Station kinds and the capability traits handlers use.
//! - [`starting_kitchen`] -- Default kitchen layout.
//! - [`world`] -- The entity index, queries, zones and station timers.

pub mod entity;
pub mod error;
pub mod geometry;
pub mod navigation;
pub mod starting_kitchen;
pub mod station;
pub mod world;

// Re-export primary types at crate root.
pub use entity::{Entity, HolderSlot, InteractionPoint, ItemHolder, Tag};
pub use error::WorldError;
pub use geometry::Vec3;
pub use navigation::{
    FloorPlan, FloorRect, KinematicNavigator, Navigator, WalkableSurface, has_arrived,
};
pub use starting_kitchen::{Kitchen, create_starting_kitchen};
pub use station::{
    Appliance, Counter, CuttingBoard, ItemContainer, ItemSupply, Oven, Processable, Station,
    StationError, SupplyCrate, store_item,
};
pub use world::{World, Zone};
