//! The shared kitchen: an entity index keyed by unique name, plus zones.
//!
//! The world is the shared mutable resource every agent competes for. It
//! offers the queries the arbiter and handlers need (exact and prefix
//! lookup, descendant tests, sphere overlap, capability search) and a
//! single [`World::advance`] that runs every station timer.

use core::ops::Bound;
use core::time::Duration;
use std::collections::BTreeMap;

use tracing::debug;

use crate::entity::Entity;
use crate::error::WorldError;
use crate::geometry::Vec3;
use crate::station::Station;

/// An axis-aligned trigger volume naming a room.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    /// Room name reported as the agent's location.
    pub name: String,
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Zone {
    /// Create a zone from two corners.
    pub fn new(name: &str, min: Vec3, max: Vec3) -> Self {
        Self {
            name: name.to_owned(),
            min,
            max,
        }
    }

    /// Whether `point` lies inside the volume (inclusive).
    pub fn contains(&self, point: Vec3) -> bool {
        (self.min.x..=self.max.x).contains(&point.x)
            && (self.min.y..=self.max.y).contains(&point.y)
            && (self.min.z..=self.max.z).contains(&point.z)
    }
}

/// The entity index.
#[derive(Debug, Clone, Default)]
pub struct World {
    entities: BTreeMap<String, Entity>,
    zones: Vec<Zone>,
}

impl World {
    /// Create an empty world.
    pub const fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            zones: Vec::new(),
        }
    }

    /// Insert an entity.
    ///
    /// If the parent carries an interaction point, the new entity is
    /// attached to it.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::DuplicateEntity`] if the name is taken, or
    /// [`WorldError::UnknownParent`] if the declared parent is missing.
    pub fn insert(&mut self, mut entity: Entity) -> Result<(), WorldError> {
        if self.entities.contains_key(&entity.name) {
            return Err(WorldError::DuplicateEntity(entity.name));
        }
        if let Some(parent_name) = entity.parent.as_deref() {
            let parent = self
                .entities
                .get_mut(parent_name)
                .ok_or_else(|| WorldError::UnknownParent {
                    child: entity.name.clone(),
                    parent: parent_name.to_owned(),
                })?;
            if let Some(point) = parent.interaction_point.as_mut() {
                point.attached.insert(entity.name.clone());
            }
        }
        entity.sync_holder();
        debug!(entity = %entity.name, "entity added to world");
        self.entities.insert(entity.name.clone(), entity);
        Ok(())
    }

    /// Remove an entity, detaching it from its parent.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if no such entity exists.
    pub fn remove(&mut self, name: &str) -> Result<Entity, WorldError> {
        let entity = self
            .entities
            .remove(name)
            .ok_or_else(|| WorldError::UnknownEntity(name.to_owned()))?;
        if let Some(point) = entity
            .parent
            .as_deref()
            .and_then(|p| self.entities.get_mut(p))
            .and_then(|p| p.interaction_point.as_mut())
        {
            point.attached.remove(name);
        }
        Ok(entity)
    }

    /// Add a room zone.
    pub fn add_zone(&mut self, zone: Zone) {
        self.zones.push(zone);
    }

    /// The first zone containing `point`.
    pub fn zone_at(&self, point: Vec3) -> Option<&Zone> {
        self.zones.iter().find(|zone| zone.contains(point))
    }

    /// Exact-name lookup.
    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Mutable exact-name lookup.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities.get_mut(name)
    }

    /// All entities, in name order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities whose name starts with `prefix`.
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.entities
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(name, _)| name.starts_with(prefix))
            .map(|(_, entity)| entity)
    }

    /// Move an entity.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::UnknownEntity`] if no such entity exists.
    pub fn set_position(&mut self, name: &str, position: Vec3) -> Result<(), WorldError> {
        let entity = self
            .entities
            .get_mut(name)
            .ok_or_else(|| WorldError::UnknownEntity(name.to_owned()))?;
        entity.position = position;
        Ok(())
    }

    /// Whether `name` sits somewhere below `ancestor` in the parent chain.
    pub fn is_descendant(&self, name: &str, ancestor: &str) -> bool {
        let mut current = self.entities.get(name).and_then(|e| e.parent.as_deref());
        // The chain can never be longer than the index; bounding the walk
        // keeps a malformed cycle from looping forever.
        for _ in 0..self.entities.len() {
            match current {
                Some(parent) if parent == ancestor => return true,
                Some(parent) => {
                    current = self.entities.get(parent).and_then(|e| e.parent.as_deref());
                }
                None => return false,
            }
        }
        false
    }

    /// Collidable entities whose collider intersects the sphere.
    pub fn overlap_sphere(&self, centre: Vec3, radius: f32) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |entity| {
            entity
                .collider
                .is_some_and(|r| entity.position.distance(centre) <= r + radius)
        })
    }

    /// Find an entity carrying a station that satisfies `pred`, checking
    /// `name` itself first and then its descendants.
    pub fn find_station<F>(&self, name: &str, pred: F) -> Option<&Entity>
    where
        F: Fn(&Station) -> bool,
    {
        let matches = |entity: &Entity| entity.station.as_ref().is_some_and(&pred);
        let root = self.entities.get(name)?;
        if matches(root) {
            return Some(root);
        }
        self.entities
            .values()
            .find(|entity| self.is_descendant(&entity.name, name) && matches(entity))
    }

    /// Run `f` against a station and re-sync the entity's item holder.
    ///
    /// Returns `None` if the entity does not exist or has no station.
    pub fn with_station<R>(&mut self, name: &str, f: impl FnOnce(&mut Station) -> R) -> Option<R> {
        let entity = self.entities.get_mut(name)?;
        let result = f(entity.station.as_mut()?);
        entity.sync_holder();
        Some(result)
    }

    /// Advance every station timer by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        for entity in self.entities.values_mut() {
            if let Some(station) = entity.station.as_mut() {
                station.advance(dt);
                entity.sync_holder();
            }
        }
    }
}
