//! Resource arbiter: turns a logical target name into a concrete, free
//! world entity.
//!
//! Resolution order:
//!
//! 1. An exact name match wins immediately, occupied or not. Naming a
//!    specific station is an intentional override.
//! 2. Otherwise every entity whose name starts with the identifier is a
//!    candidate. Candidates are walked nearest first and the first
//!    unoccupied one is returned.
//!
//! Occupancy is observed, never reserved. Two agents resolving in the same
//! tick may pick the same station; the single tick loop that drives every
//! agent keeps that window to one tick.

use paprika_world::{Entity, Tag, Vec3, World};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ResolveError;

/// Spatial probe used when a station has no structural contents marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Height above the entity centre where the probe sphere sits.
    pub probe_height: f32,
    /// Probe sphere radius.
    pub probe_radius: f32,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            probe_height: 0.6,
            probe_radius: 0.4,
        }
    }
}

/// Which convention decided an occupancy test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccupancyRule {
    /// An item-holder slot is active.
    ItemHolder,
    /// The interaction point has an attached child.
    InteractionPoint,
    /// The spatial probe hit a foreign collider.
    Probe,
}

/// A point-in-time resolution result. Never cache it across ticks.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedTarget {
    /// Entity name.
    pub id: String,
    /// Entity centre.
    pub position: Vec3,
}

impl ResolvedTarget {
    fn from_entity(entity: &Entity) -> Self {
        Self {
            id: entity.name.clone(),
            position: entity.position,
        }
    }
}

/// The resource arbiter.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResourceArbiter {
    probe: ProbeConfig,
}

impl ResourceArbiter {
    /// Create an arbiter with the given probe settings.
    pub const fn new(probe: ProbeConfig) -> Self {
        Self { probe }
    }

    /// Resolve `identifier` for an agent standing at `requester`.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::NotFound`] when nothing matches, or
    /// [`ResolveError::AllOccupied`] when every prefix match is in use.
    pub fn resolve(
        &self,
        world: &World,
        identifier: &str,
        requester: Vec3,
    ) -> Result<ResolvedTarget, ResolveError> {
        if let Some(entity) = world.get(identifier) {
            return Ok(ResolvedTarget::from_entity(entity));
        }

        let mut candidates: Vec<(&Entity, f32)> = world
            .with_prefix(identifier)
            .map(|entity| (entity, entity.position.distance(requester)))
            .collect();
        if candidates.is_empty() {
            return Err(ResolveError::NotFound {
                identifier: identifier.to_owned(),
            });
        }
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (entity, distance) in &candidates {
            match self.occupancy(world, entity) {
                Some(rule) => {
                    debug!(
                        candidate = %entity.name,
                        distance,
                        rule = ?rule,
                        "skipping occupied candidate"
                    );
                }
                None => return Ok(ResolvedTarget::from_entity(entity)),
            }
        }

        warn!(
            identifier,
            candidates = candidates.len(),
            "all candidates are occupied"
        );
        Err(ResolveError::AllOccupied {
            identifier: identifier.to_owned(),
            candidates: candidates.len(),
        })
    }

    /// Whether `entity` is in use.
    pub fn is_occupied(&self, world: &World, entity: &Entity) -> bool {
        self.occupancy(world, entity).is_some()
    }

    /// The rule that marks `entity` occupied, if any. The first applicable
    /// convention decides; later ones are not consulted.
    pub fn occupancy(&self, world: &World, entity: &Entity) -> Option<OccupancyRule> {
        if let Some(holder) = entity.item_holder.as_ref() {
            return holder.any_active().then_some(OccupancyRule::ItemHolder);
        }
        if let Some(point) = entity.interaction_point.as_ref() {
            return (!point.attached.is_empty()).then_some(OccupancyRule::InteractionPoint);
        }
        let centre = entity.position + Vec3::UP * self.probe.probe_height;
        world
            .overlap_sphere(centre, self.probe.probe_radius)
            .any(|hit| {
                hit.name != entity.name
                    && !world.is_descendant(&hit.name, &entity.name)
                    && !hit.has_tag(Tag::Player)
                    && !hit.has_tag(Tag::Agent)
            })
            .then_some(OccupancyRule::Probe)
    }
}
