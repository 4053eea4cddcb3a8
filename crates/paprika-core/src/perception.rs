//! Perception snapshot assembly.
//!
//! The snapshot is everything the planner learns about the kitchen: the
//! agent's room, hand and last outcome, plus every interactable within the
//! vision radius, nearest first, each with its coarse kind and current
//! station state.

use chrono::Timelike;
use paprika_agents::AgentState;
use paprika_types::{Perception, WorldObject};
use paprika_world::{Tag, Vec3, World};

use crate::config::PerceptionConfig;

/// Hour of the local wall clock, used as `time_hour`.
pub fn wall_clock_hour() -> u32 {
    chrono::Local::now().hour()
}

/// Builds [`Perception`] snapshots for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionBuilder {
    vision_radius: f32,
    mode: String,
    day: u32,
}

impl PerceptionBuilder {
    /// A builder using the configured radius, mode and day.
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            vision_radius: config.vision_radius,
            mode: config.mode.clone(),
            day: config.day,
        }
    }

    /// Interactables within the vision radius of `origin`, nearest first.
    pub fn scan(&self, world: &World, origin: Vec3) -> Vec<WorldObject> {
        let mut sensed: Vec<(f32, WorldObject)> = world
            .entities()
            .filter(|e| e.has_tag(Tag::Interactable))
            .filter_map(|e| {
                let distance = e.position.distance(origin);
                (distance <= self.vision_radius).then(|| {
                    (
                        distance,
                        WorldObject {
                            id: e.name.clone(),
                            kind: e.kind_label().to_owned(),
                            position: e.position.into(),
                            distance,
                            state: e.state_label(),
                        },
                    )
                })
            })
            .collect();
        sensed.sort_by(|(a, x), (b, y)| a.total_cmp(b).then_with(|| x.id.cmp(&y.id)));
        sensed.into_iter().map(|(_, object)| object).collect()
    }

    /// Whether a player stands within the vision radius of `origin`.
    pub fn player_nearby(&self, world: &World, origin: Vec3) -> bool {
        world
            .entities()
            .any(|e| e.has_tag(Tag::Player) && e.position.distance(origin) <= self.vision_radius)
    }

    /// Assemble the full snapshot.
    pub fn build(&self, world: &World, origin: Vec3, state: &AgentState, hour: u32) -> Perception {
        Perception {
            time_hour: hour,
            day: self.day,
            mode: self.mode.clone(),
            location_id: state.location().to_owned(),
            player_nearby: self.player_nearby(world, origin),
            nearby_objects: self.scan(world, origin),
            held_item: state.held_item().map(str::to_owned),
            last_action_status: state.last_status(),
            last_action_error: state.last_error().map(str::to_owned),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use paprika_agents::ActionTicket;
    use paprika_types::ActionStatus;
    use paprika_world::{ItemSupply, create_starting_kitchen};

    use super::*;

    fn builder() -> PerceptionBuilder {
        PerceptionBuilder::new(&PerceptionConfig::default())
    }

    #[test]
    fn scan_sorts_by_distance_and_respects_radius() {
        let kitchen = create_starting_kitchen().unwrap();
        let objects = builder().scan(&kitchen.world, Vec3::ZERO);

        let first = objects.first().unwrap();
        assert_eq!(first.id, "PrepTable_3");
        assert_eq!(first.kind, "Surface");
        assert_eq!(first.state, "empty");

        let ids: Vec<_> = objects.iter().map(|o| o.id.as_str()).collect();
        assert!(ids.contains(&"CutBoard"));
        assert!(ids.contains(&"Oven"));
        assert!(!ids.contains(&"OnionBox"), "OnionBox is beyond 5m");
        assert!(!ids.contains(&"Player"));
        assert!(
            objects
                .windows(2)
                .all(|pair| pair.first().unwrap().distance <= pair.get(1).unwrap().distance)
        );
    }

    #[test]
    fn player_nearby_only_within_radius() {
        let kitchen = create_starting_kitchen().unwrap();
        assert!(!builder().player_nearby(&kitchen.world, Vec3::ZERO));
        assert!(builder().player_nearby(&kitchen.world, Vec3::new(6.0, 0.0, 0.0)));
    }

    #[test]
    fn snapshot_carries_agent_state() {
        let kitchen = create_starting_kitchen().unwrap();
        let mut state = AgentState::new();
        state.set_location("Kitchen");
        state.set_held_item("onion");
        let ticket: ActionTicket = state.begin_action();
        state.report(ticket, ActionStatus::Failure, "Target 'Sink' not found");

        let perception = builder().build(&kitchen.world, Vec3::ZERO, &state, 14);
        assert_eq!(perception.time_hour, 14);
        assert_eq!(perception.day, 1);
        assert_eq!(perception.mode, "reality");
        assert_eq!(perception.location_id, "Kitchen");
        assert_eq!(perception.held_item.as_deref(), Some("onion"));
        assert_eq!(perception.last_action_status, ActionStatus::Failure);
        assert_eq!(
            perception.last_action_error.as_deref(),
            Some("Target 'Sink' not found")
        );
    }

    #[test]
    fn station_state_is_reported() {
        let mut kitchen = create_starting_kitchen().unwrap();
        let item = kitchen
            .world
            .with_station("MeatBox", |s| {
                s.supply_mut().map(ItemSupply::dispense)
            })
            .flatten()
            .unwrap()
            .unwrap();
        assert_eq!(item, "meat");
        let objects = builder().scan(&kitchen.world, Vec3::ZERO);
        let crate_box = objects.iter().find(|o| o.id == "MeatBox").unwrap();
        assert_eq!(crate_box.state, "cooldown");
        assert_eq!(crate_box.kind, "Supply");
    }

    #[test]
    fn wall_clock_hour_is_valid() {
        assert!(wall_clock_hour() < 24);
    }
}
