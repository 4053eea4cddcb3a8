//! World entities and the structural conventions the arbiter relies on.
//!
//! An entity is identified by its unique name. Stations advertise their
//! contents through one of three conventions:
//!
//! - an [`ItemHolder`]: a set of display slots, one per item kind, toggled
//!   active while the station holds that item;
//! - an [`InteractionPoint`]: a socket that other entities attach to;
//! - nothing explicit, in which case only the collider tells what is there.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;
use crate::station::Station;

/// Tags used by sensing and by the occupancy probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// The human operator.
    Player,
    /// An autonomous agent.
    Agent,
    /// Something the planner may target.
    Interactable,
}

/// One display slot of an [`ItemHolder`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderSlot {
    /// Item kind this slot displays.
    pub item: String,
    /// Whether the slot is currently shown.
    pub active: bool,
}

/// Child container whose active slots show what a station holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemHolder {
    slots: Vec<HolderSlot>,
}

impl ItemHolder {
    /// Create a holder with one inactive slot per item kind.
    pub fn with_slots(items: &[&str]) -> Self {
        Self {
            slots: items
                .iter()
                .map(|item| HolderSlot {
                    item: (*item).to_owned(),
                    active: false,
                })
                .collect(),
        }
    }

    /// Show exactly the slot for `item`; hide everything for `None`.
    ///
    /// Items without a dedicated slot get one, so a holder can always
    /// display what its station holds.
    pub fn show(&mut self, item: Option<&str>) {
        for slot in &mut self.slots {
            slot.active = item == Some(slot.item.as_str());
        }
        if let Some(item) = item
            && !self.slots.iter().any(|slot| slot.item == item)
        {
            self.slots.push(HolderSlot {
                item: item.to_owned(),
                active: true,
            });
        }
    }

    /// Whether any slot is active.
    pub fn any_active(&self) -> bool {
        self.slots.iter().any(|slot| slot.active)
    }

    /// All slots.
    pub fn slots(&self) -> &[HolderSlot] {
        &self.slots
    }
}

/// Socket that other entities attach to as children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InteractionPoint {
    /// Names of attached entities.
    pub attached: BTreeSet<String>,
}

/// A named thing in the kitchen.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    /// Unique name, also the identifier the planner uses.
    pub name: String,
    /// Centre position.
    pub position: Vec3,
    /// Sphere collider radius; `None` means not collidable.
    pub collider: Option<f32>,
    /// Sensing and probe tags.
    pub tags: BTreeSet<Tag>,
    /// Name of the parent entity, if any.
    pub parent: Option<String>,
    /// Display slots for held items.
    pub item_holder: Option<ItemHolder>,
    /// Attachment socket.
    pub interaction_point: Option<InteractionPoint>,
    /// Where an agent should stand to use this entity.
    pub stand_point: Option<Vec3>,
    /// Station behavior.
    pub station: Option<Station>,
}

impl Entity {
    /// Create a bare entity at `position`.
    pub fn new(name: &str, position: Vec3) -> Self {
        Self {
            name: name.to_owned(),
            position,
            collider: None,
            tags: BTreeSet::new(),
            parent: None,
            item_holder: None,
            interaction_point: None,
            stand_point: None,
            station: None,
        }
    }

    /// Add a sphere collider.
    #[must_use]
    pub fn with_collider(mut self, radius: f32) -> Self {
        self.collider = Some(radius);
        self
    }

    /// Add a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    /// Attach to a parent entity.
    #[must_use]
    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_owned());
        self
    }

    /// Add an item holder with the given slots.
    #[must_use]
    pub fn with_item_holder(mut self, holder: ItemHolder) -> Self {
        self.item_holder = Some(holder);
        self
    }

    /// Add an empty interaction point.
    #[must_use]
    pub fn with_interaction_point(mut self) -> Self {
        self.interaction_point = Some(InteractionPoint::default());
        self
    }

    /// Set the stand point.
    #[must_use]
    pub fn with_stand_point(mut self, point: Vec3) -> Self {
        self.stand_point = Some(point);
        self
    }

    /// Attach station behavior. Interactable by default.
    #[must_use]
    pub fn with_station(mut self, station: Station) -> Self {
        self.station = Some(station);
        self.tags.insert(Tag::Interactable);
        self.sync_holder();
        self
    }

    /// Whether the entity carries `tag`.
    pub fn has_tag(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Distance from `from` to the closest point of the collider, or to the
    /// centre when there is no collider.
    pub fn surface_distance(&self, from: Vec3) -> f32 {
        let centre = self.position.distance(from);
        self.collider
            .map_or(centre, |radius| (centre - radius).max(0.0))
    }

    /// Coarse kind label reported in perception.
    pub fn kind_label(&self) -> &'static str {
        if self.has_tag(Tag::Player) {
            return "Player";
        }
        if self.has_tag(Tag::Agent) {
            return "Agent";
        }
        self.station.as_ref().map_or("Prop", Station::kind_label)
    }

    /// Condition label reported in perception.
    pub fn state_label(&self) -> String {
        self.station
            .as_ref()
            .map_or_else(|| "default".to_owned(), Station::state_label)
    }

    /// Mirror the station contents onto the item holder.
    pub fn sync_holder(&mut self) {
        let held = self
            .station
            .as_ref()
            .and_then(Station::container)
            .and_then(|c| c.held_item().map(str::to_owned));
        if let Some(holder) = self.item_holder.as_mut() {
            holder.show(held.as_deref());
        }
    }
}
