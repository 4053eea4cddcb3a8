//! Kitchen stations and the capabilities they expose to action handlers.
//!
//! Handlers never match on a concrete station type. They ask a [`Station`]
//! for a capability ([`ItemContainer`], [`Processable`], [`ItemSupply`],
//! [`Appliance`]) and act on whatever implements it. Shared put-item
//! behavior lives in [`store_item`], which every container calls.

use core::time::Duration;
use std::collections::BTreeMap;

/// Reasons a station refuses an interaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StationError {
    /// The station already holds an item.
    #[error("station is already holding {held}")]
    Full {
        /// What the station currently holds.
        held: String,
    },

    /// The station does not take this kind of item.
    #[error("station does not accept {item}")]
    NotAccepted {
        /// The rejected item.
        item: String,
    },

    /// The supply has run out.
    #[error("no {item} left in supply")]
    Empty {
        /// The item the supply dispenses.
        item: String,
    },

    /// The supply was used recently and is still cooling down.
    #[error("supply is cooling down ({remaining_ms} ms left)")]
    CoolingDown {
        /// Milliseconds until the supply is usable again.
        remaining_ms: u64,
    },
}

/// A station that holds at most one item.
pub trait ItemContainer {
    /// The item currently held, if any.
    fn held_item(&self) -> Option<&str>;

    /// Place an item on the station.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Full`] or [`StationError::NotAccepted`].
    fn put_item(&mut self, item: &str) -> Result<(), StationError>;

    /// Remove and return the held item.
    fn take_item(&mut self) -> Option<String>;

    /// Swap the displayed contents for `item`, bypassing acceptance rules.
    fn replace_item(&mut self, item: &str);
}

/// A station that transforms its contents one tick at a time.
pub trait Processable {
    /// Advance processing by `dt`. Returns the result item once done.
    fn process(&mut self, dt: Duration) -> Option<String>;
}

/// A station that hands out items.
pub trait ItemSupply {
    /// Dispense one item.
    ///
    /// # Errors
    ///
    /// Returns [`StationError::Empty`] or [`StationError::CoolingDown`].
    fn dispense(&mut self) -> Result<String, StationError>;
}

/// A station running its own timer until its contents are done.
pub trait Appliance {
    /// Whether the contents are finished and ready to be taken.
    fn is_ready(&self) -> bool;
}

/// Default put-item behavior shared by every container.
///
/// # Errors
///
/// Returns [`StationError::Full`] if `slot` is occupied, or
/// [`StationError::NotAccepted`] if `accepted` is false.
pub fn store_item(slot: &mut Option<String>, item: &str, accepted: bool) -> Result<(), StationError> {
    if let Some(held) = slot {
        return Err(StationError::Full { held: held.clone() });
    }
    if !accepted {
        return Err(StationError::NotAccepted {
            item: item.to_owned(),
        });
    }
    *slot = Some(item.to_owned());
    Ok(())
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Counter
// ---------------------------------------------------------------------------

/// A plain surface that holds any single item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counter {
    held: Option<String>,
}

impl Counter {
    /// Create an empty counter.
    pub const fn new() -> Self {
        Self { held: None }
    }

    /// Create a counter already holding `item`.
    pub fn holding(item: &str) -> Self {
        Self {
            held: Some(item.to_owned()),
        }
    }
}

impl ItemContainer for Counter {
    fn held_item(&self) -> Option<&str> {
        self.held.as_deref()
    }

    fn put_item(&mut self, item: &str) -> Result<(), StationError> {
        store_item(&mut self.held, item, true)
    }

    fn take_item(&mut self) -> Option<String> {
        self.held.take()
    }

    fn replace_item(&mut self, item: &str) {
        self.held = Some(item.to_owned());
    }
}

// ---------------------------------------------------------------------------
// Cutting board
// ---------------------------------------------------------------------------

/// A surface that slices raw ingredients after a fixed amount of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CuttingBoard {
    recipes: BTreeMap<String, String>,
    held: Option<String>,
    progress: Duration,
    process_time: Duration,
}

impl CuttingBoard {
    /// Create an empty board with `raw -> sliced` recipes.
    pub fn new(recipes: &[(&str, &str)], process_time: Duration) -> Self {
        Self {
            recipes: recipes
                .iter()
                .map(|(raw, sliced)| ((*raw).to_owned(), (*sliced).to_owned()))
                .collect(),
            held: None,
            progress: Duration::ZERO,
            process_time,
        }
    }

    fn accepts(&self, item: &str) -> bool {
        self.recipes.contains_key(item) || self.recipes.values().any(|out| out == item)
    }
}

impl ItemContainer for CuttingBoard {
    fn held_item(&self) -> Option<&str> {
        self.held.as_deref()
    }

    fn put_item(&mut self, item: &str) -> Result<(), StationError> {
        let accepted = self.accepts(item);
        store_item(&mut self.held, item, accepted)?;
        self.progress = Duration::ZERO;
        Ok(())
    }

    fn take_item(&mut self) -> Option<String> {
        self.progress = Duration::ZERO;
        self.held.take()
    }

    fn replace_item(&mut self, item: &str) {
        self.progress = Duration::ZERO;
        self.held = Some(item.to_owned());
    }
}

impl Processable for CuttingBoard {
    fn process(&mut self, dt: Duration) -> Option<String> {
        let output = self.held.as_ref().and_then(|raw| self.recipes.get(raw))?.clone();
        self.progress = self.progress.saturating_add(dt);
        if self.progress < self.process_time {
            return None;
        }
        self.progress = Duration::ZERO;
        Some(output)
    }
}

// ---------------------------------------------------------------------------
// Oven
// ---------------------------------------------------------------------------

/// An appliance that cooks its contents on its own timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oven {
    recipes: BTreeMap<String, String>,
    held: Option<String>,
    elapsed: Duration,
    cook_time: Duration,
}

impl Oven {
    /// Create an empty oven with `raw -> cooked` recipes.
    pub fn new(recipes: &[(&str, &str)], cook_time: Duration) -> Self {
        Self {
            recipes: recipes
                .iter()
                .map(|(raw, cooked)| ((*raw).to_owned(), (*cooked).to_owned()))
                .collect(),
            held: None,
            elapsed: Duration::ZERO,
            cook_time,
        }
    }

    fn is_cooking(&self) -> bool {
        self.held
            .as_ref()
            .is_some_and(|item| self.recipes.contains_key(item))
    }

    /// Advance the cooking timer.
    pub fn advance(&mut self, dt: Duration) {
        if !self.is_cooking() {
            return;
        }
        self.elapsed = self.elapsed.saturating_add(dt);
        if self.elapsed >= self.cook_time {
            let cooked = self
                .held
                .as_ref()
                .and_then(|raw| self.recipes.get(raw))
                .cloned();
            if cooked.is_some() {
                self.held = cooked;
            }
        }
    }
}

impl ItemContainer for Oven {
    fn held_item(&self) -> Option<&str> {
        self.held.as_deref()
    }

    fn put_item(&mut self, item: &str) -> Result<(), StationError> {
        let accepted = self.recipes.contains_key(item);
        store_item(&mut self.held, item, accepted)?;
        self.elapsed = Duration::ZERO;
        Ok(())
    }

    fn take_item(&mut self) -> Option<String> {
        self.elapsed = Duration::ZERO;
        self.held.take()
    }

    fn replace_item(&mut self, item: &str) {
        self.elapsed = Duration::ZERO;
        self.held = Some(item.to_owned());
    }
}

impl Appliance for Oven {
    fn is_ready(&self) -> bool {
        self.held
            .as_ref()
            .is_some_and(|item| self.recipes.values().any(|cooked| cooked == item))
    }
}

// ---------------------------------------------------------------------------
// Supply crate
// ---------------------------------------------------------------------------

/// A crate dispensing one kind of ingredient, with a cooldown between uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyCrate {
    item: String,
    stock: Option<u32>,
    cooldown: Duration,
    remaining: Duration,
}

impl SupplyCrate {
    /// An endless supply of `item`.
    pub fn endless(item: &str, cooldown: Duration) -> Self {
        Self {
            item: item.to_owned(),
            stock: None,
            cooldown,
            remaining: Duration::ZERO,
        }
    }

    /// A supply holding `stock` units of `item`.
    pub fn limited(item: &str, stock: u32, cooldown: Duration) -> Self {
        Self {
            stock: Some(stock),
            ..Self::endless(item, cooldown)
        }
    }

    /// The item this crate dispenses.
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Units left, or `None` for an endless supply.
    pub const fn stock(&self) -> Option<u32> {
        self.stock
    }

    /// Whether the crate is still cooling down.
    pub fn is_cooling_down(&self) -> bool {
        !self.remaining.is_zero()
    }

    /// Advance the cooldown timer.
    pub const fn advance(&mut self, dt: Duration) {
        self.remaining = self.remaining.saturating_sub(dt);
    }
}

impl ItemSupply for SupplyCrate {
    fn dispense(&mut self) -> Result<String, StationError> {
        if self.is_cooling_down() {
            return Err(StationError::CoolingDown {
                remaining_ms: millis(self.remaining),
            });
        }
        if let Some(stock) = self.stock.as_mut() {
            *stock = stock.checked_sub(1).ok_or_else(|| StationError::Empty {
                item: self.item.clone(),
            })?;
        }
        self.remaining = self.cooldown;
        Ok(self.item.clone())
    }
}

// ---------------------------------------------------------------------------
// Station
// ---------------------------------------------------------------------------

/// Every kind of station the kitchen knows about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Station {
    /// Ingredient crate.
    Supply(SupplyCrate),
    /// Plain surface.
    Counter(Counter),
    /// Slicing surface.
    CuttingBoard(CuttingBoard),
    /// Cooking appliance.
    Oven(Oven),
}

impl Station {
    /// The container capability, if this station holds items.
    pub fn container(&self) -> Option<&dyn ItemContainer> {
        match self {
            Self::Counter(c) => Some(c),
            Self::CuttingBoard(b) => Some(b),
            Self::Oven(o) => Some(o),
            Self::Supply(_) => None,
        }
    }

    /// Mutable container capability.
    pub fn container_mut(&mut self) -> Option<&mut dyn ItemContainer> {
        match self {
            Self::Counter(c) => Some(c),
            Self::CuttingBoard(b) => Some(b),
            Self::Oven(o) => Some(o),
            Self::Supply(_) => None,
        }
    }

    /// The per-tick processing capability.
    pub fn processor_mut(&mut self) -> Option<&mut dyn Processable> {
        match self {
            Self::CuttingBoard(b) => Some(b),
            _ => None,
        }
    }

    /// The dispensing capability.
    pub fn supply_mut(&mut self) -> Option<&mut dyn ItemSupply> {
        match self {
            Self::Supply(s) => Some(s),
            _ => None,
        }
    }

    /// The self-timed appliance capability.
    pub fn appliance(&self) -> Option<&dyn Appliance> {
        match self {
            Self::Oven(o) => Some(o),
            _ => None,
        }
    }

    /// Whether this station can process items tick by tick.
    pub const fn is_processor(&self) -> bool {
        matches!(self, Self::CuttingBoard(_))
    }

    /// Whether this station is a self-timed appliance.
    pub const fn is_appliance(&self) -> bool {
        matches!(self, Self::Oven(_))
    }

    /// Advance any internal timers.
    pub fn advance(&mut self, dt: Duration) {
        match self {
            Self::Supply(s) => s.advance(dt),
            Self::Oven(o) => o.advance(dt),
            Self::Counter(_) | Self::CuttingBoard(_) => {}
        }
    }

    /// Coarse kind reported in perception.
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Supply(_) => "Supply",
            Self::Counter(_) => "Surface",
            Self::CuttingBoard(_) => "Processor",
            Self::Oven(_) => "Appliance",
        }
    }

    /// Condition label reported in perception.
    pub fn state_label(&self) -> String {
        match self {
            Self::Supply(s) if s.stock == Some(0) => "empty".to_owned(),
            Self::Supply(s) if s.is_cooling_down() => "cooldown".to_owned(),
            Self::Supply(_) => "default".to_owned(),
            Self::Oven(o) if o.is_ready() => "ready".to_owned(),
            Self::Oven(o) if o.is_cooking() => "cooking".to_owned(),
            Self::Counter(_) | Self::CuttingBoard(_) | Self::Oven(_) => self
                .container()
                .and_then(ItemContainer::held_item)
                .map_or_else(|| "empty".to_owned(), |item| format!("holding:{item}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(500);

    #[test]
    fn counter_refuses_second_item() {
        let mut counter = Counter::new();
        counter.put_item("onion").unwrap();
        assert_eq!(
            counter.put_item("tomato"),
            Err(StationError::Full {
                held: "onion".to_owned()
            })
        );
        assert_eq!(counter.take_item().as_deref(), Some("onion"));
        assert!(counter.held_item().is_none());
    }

    #[test]
    fn cutting_board_filters_items() {
        let mut board = CuttingBoard::new(&[("tomato", "sliced_tomato")], TICK);
        assert!(matches!(
            board.put_item("meat"),
            Err(StationError::NotAccepted { .. })
        ));
        board.put_item("sliced_tomato").unwrap();
    }

    #[test]
    fn cutting_board_processes_after_enough_work() {
        let mut board = CuttingBoard::new(&[("tomato", "sliced_tomato")], Duration::from_secs(1));
        assert!(board.process(TICK).is_none(), "empty board never yields");
        board.put_item("tomato").unwrap();
        assert!(board.process(TICK).is_none());
        assert_eq!(board.process(TICK).as_deref(), Some("sliced_tomato"));
    }

    #[test]
    fn sliced_items_do_not_process_again() {
        let mut board = CuttingBoard::new(&[("onion", "sliced_onion")], TICK);
        board.replace_item("sliced_onion");
        assert!(board.process(Duration::from_secs(5)).is_none());
    }

    #[test]
    fn oven_cooks_on_its_own_timer() {
        let mut oven = Oven::new(&[("meat", "steak")], Duration::from_secs(2));
        oven.put_item("meat").unwrap();
        let mut station = Station::Oven(oven);
        assert_eq!(station.state_label(), "cooking");
        station.advance(Duration::from_secs(1));
        assert!(!station.appliance().unwrap().is_ready());
        station.advance(Duration::from_secs(1));
        assert!(station.appliance().unwrap().is_ready());
        assert_eq!(station.state_label(), "ready");
    }

    #[test]
    fn supply_cooldown_and_stock() {
        let mut crate_ = SupplyCrate::limited("onion", 1, Duration::from_secs(1));
        assert_eq!(crate_.dispense().unwrap(), "onion");
        assert!(matches!(
            crate_.dispense(),
            Err(StationError::CoolingDown { remaining_ms: 1000 })
        ));
        crate_.advance(Duration::from_secs(1));
        assert!(matches!(crate_.dispense(), Err(StationError::Empty { .. })));
        assert_eq!(Station::Supply(crate_).state_label(), "empty");
    }

    #[test]
    fn store_item_is_shared_by_containers() {
        let mut slot = None;
        store_item(&mut slot, "plate", true).unwrap();
        assert!(matches!(
            store_item(&mut slot, "plate", true),
            Err(StationError::Full { .. })
        ));
    }
}
