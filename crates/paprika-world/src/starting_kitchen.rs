//! Default starting kitchen.
//!
//! One open kitchen floor with a dining room to the east:
//!
//! - three supply crates along the north wall (`OnionBox`, `TomatoBox`,
//!   `MeatBox`);
//! - three prep tables with item holders (`PrepTable_1..3`), the cutting
//!   board sitting on the middle one;
//! - an `Oven` and a serving `Plate`;
//! - the human `Player` standing in the dining room.

use core::time::Duration;

use crate::entity::{Entity, ItemHolder, Tag};
use crate::error::WorldError;
use crate::geometry::Vec3;
use crate::navigation::{FloorPlan, FloorRect};
use crate::station::{Counter, CuttingBoard, Oven, Station, SupplyCrate};
use crate::world::{World, Zone};

/// Ingredient kinds a prep table can display.
const PREP_SLOTS: &[&str] = &[
    "onion",
    "tomato",
    "meat",
    "sliced_onion",
    "sliced_tomato",
    "steak",
];

/// Raw-to-sliced recipes of the cutting board.
const SLICE_RECIPES: &[(&str, &str)] = &[("onion", "sliced_onion"), ("tomato", "sliced_tomato")];

/// Raw-to-cooked recipes of the oven.
const OVEN_RECIPES: &[(&str, &str)] = &[("meat", "steak")];

/// Cooldown between two pickups from the same crate.
const SUPPLY_COOLDOWN: Duration = Duration::from_secs(2);

/// Work needed to slice one ingredient.
const SLICE_TIME: Duration = Duration::from_secs(3);

/// Time the oven needs to cook one item.
const COOK_TIME: Duration = Duration::from_secs(8);

/// The starting kitchen: world, walkable floor and agent spawn point.
#[derive(Debug, Clone)]
pub struct Kitchen {
    /// Entity index with zones.
    pub world: World,
    /// Walkable floor.
    pub floor: FloorPlan,
    /// Where agents spawn.
    pub agent_spawn: Vec3,
}

fn supply(name: &str, item: &str, x: f32) -> Entity {
    Entity::new(name, Vec3::new(x, 0.0, 4.0))
        .with_collider(0.5)
        .with_stand_point(Vec3::new(x, 0.0, 3.0))
        .with_station(Station::Supply(SupplyCrate::endless(item, SUPPLY_COOLDOWN)))
}

fn prep_table(index: u8, x: f32) -> Entity {
    Entity::new(&format!("PrepTable_{index}"), Vec3::new(x, 0.0, -2.0))
        .with_collider(0.6)
        .with_stand_point(Vec3::new(x, 0.0, -1.0))
        .with_item_holder(ItemHolder::with_slots(PREP_SLOTS))
        .with_station(Station::Counter(Counter::new()))
}

/// Build the starting kitchen.
///
/// # Errors
///
/// Returns [`WorldError`] if the layout contains duplicate names or
/// dangling parents.
pub fn create_starting_kitchen() -> Result<Kitchen, WorldError> {
    let mut world = World::new();

    world.insert(supply("OnionBox", "onion", -4.0))?;
    world.insert(supply("TomatoBox", "tomato", -2.0))?;
    world.insert(supply("MeatBox", "meat", 0.0))?;

    world.insert(prep_table(1, -4.0))?;
    world.insert(prep_table(2, -2.0))?;
    world.insert(prep_table(3, 0.0))?;

    world.insert(
        Entity::new("CutBoard", Vec3::new(-2.0, 0.9, -2.0))
            .with_parent("PrepTable_2")
            .with_item_holder(ItemHolder::with_slots(PREP_SLOTS))
            .with_station(Station::CuttingBoard(CuttingBoard::new(
                SLICE_RECIPES,
                SLICE_TIME,
            ))),
    )?;

    world.insert(
        Entity::new("Oven", Vec3::new(3.0, 0.0, -2.0))
            .with_collider(0.7)
            .with_stand_point(Vec3::new(3.0, 0.0, -0.8))
            .with_interaction_point()
            .with_station(Station::Oven(Oven::new(OVEN_RECIPES, COOK_TIME))),
    )?;

    world.insert(
        Entity::new("Plate", Vec3::new(3.0, 0.9, 2.0))
            .with_collider(0.3)
            .with_station(Station::Counter(Counter::new())),
    )?;

    world.insert(
        Entity::new("Player", Vec3::new(9.0, 0.0, 0.0))
            .with_collider(0.3)
            .with_tag(Tag::Player),
    )?;

    world.add_zone(Zone::new(
        "Kitchen",
        Vec3::new(-6.0, -1.0, -6.0),
        Vec3::new(6.0, 3.0, 6.0),
    ));
    world.add_zone(Zone::new(
        "DiningRoom",
        Vec3::new(6.0, -1.0, -6.0),
        Vec3::new(14.0, 3.0, 6.0),
    ));

    let floor = FloorPlan::new(0.0)
        .with_rect(FloorRect {
            min_x: -6.0,
            max_x: 6.0,
            min_z: -6.0,
            max_z: 6.0,
        })
        .with_rect(FloorRect {
            min_x: 6.0,
            max_x: 14.0,
            min_z: -6.0,
            max_z: 6.0,
        });

    Ok(Kitchen {
        world,
        floor,
        agent_spawn: Vec3::new(0.0, 0.0, 1.0),
    })
}
