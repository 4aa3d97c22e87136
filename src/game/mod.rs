//! # Game Module
//!
//! Core game state management, the room graph and the actions that mutate them.
//!
//! This module contains the fundamental building blocks of Warren:
//! - The room graph and its connectivity checks
//! - Game state, the player and the shared lock handle
//! - Actions (move, pick-up, drop, swap)
//! - Save and map persistence

pub mod actions;
pub mod graph;
pub mod persistence;
pub mod state;

pub use actions::*;
pub use graph::*;
pub use persistence::*;
pub use state::*;

use serde::{Deserialize, Serialize};

/// Index of a room in the room graph, always `< vertex_count`.
pub type RoomId = usize;

/// Identifier of an item, unique across the whole world.
pub type ItemId = u32;

/// Printed in place of an empty slot.
pub const EMPTY_SLOT: i64 = -1;

/// A world object and the room it wants to be taken to.
///
/// # Examples
///
/// ```
/// use warren::Item;
///
/// let item = Item::new(7, 2);
/// assert_eq!(item.id, 7);
/// assert_eq!(item.destination, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub destination: RoomId,
}

impl Item {
    /// Creates a new item.
    pub fn new(id: ItemId, destination: RoomId) -> Self {
        Self { id, destination }
    }
}

/// A two-slot container kept compacted toward index 0.
///
/// Rooms, their destination records and the player's inventory all hold at
/// most two things. A populated slot 1 never follows an empty slot 0.
///
/// # Examples
///
/// ```
/// use warren::Slots;
///
/// let mut slots = Slots::new();
/// slots.push(10).unwrap();
/// slots.push(20).unwrap();
/// assert!(slots.push(30).is_err());
///
/// assert_eq!(slots.remove(0), Some(10));
/// assert_eq!(slots.get(0), Some(20));
/// assert_eq!(slots.get(1), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slots<T> {
    slots: [Option<T>; 2],
}

impl<T: Copy + PartialEq> Slots<T> {
    /// Number of slots in every container.
    pub const CAPACITY: usize = 2;

    /// Creates an empty container.
    pub fn new() -> Self {
        Self {
            slots: [None, None],
        }
    }

    /// Rebuilds a container from raw slots, e.g. when loading a save.
    ///
    /// The slots are taken as-is; use [`Slots::is_compacted`] to validate.
    pub fn from_array(slots: [Option<T>; 2]) -> Self {
        Self { slots }
    }

    /// Returns the raw slots.
    pub fn as_array(&self) -> [Option<T>; 2] {
        self.slots
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == Self::CAPACITY
    }

    /// Gets the value in a slot.
    pub fn get(&self, index: usize) -> Option<T> {
        self.slots.get(index).copied().flatten()
    }

    /// Stores a value in the first free slot, handing it back when full.
    pub fn push(&mut self, value: T) -> Result<usize, T> {
        match self.slots.iter().position(|slot| slot.is_none()) {
            Some(index) => {
                self.slots[index] = Some(value);
                Ok(index)
            }
            None => Err(value),
        }
    }

    /// Finds the first slot whose value matches the predicate.
    pub fn position(&self, mut predicate: impl FnMut(&T) -> bool) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(&mut predicate))
    }

    /// Checks whether a value is stored.
    pub fn contains(&self, value: &T) -> bool {
        self.position(|stored| stored == value).is_some()
    }

    /// Takes the value out of a slot and shifts slot 1 down into the gap.
    pub fn remove(&mut self, index: usize) -> Option<T> {
        let taken = self.slots.get_mut(index)?.take()?;
        if index == 0 {
            self.slots[0] = self.slots[1].take();
        }
        Some(taken)
    }

    /// Replaces an occupied slot, returning the previous value.
    pub fn replace(&mut self, index: usize, value: T) -> Option<T> {
        let slot = self.slots.get_mut(index)?;
        if slot.is_none() {
            return None;
        }
        slot.replace(value)
    }

    /// Iterates over occupied slots in order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        self.slots.iter().filter_map(|slot| *slot)
    }

    /// True when no occupied slot follows an empty one.
    pub fn is_compacted(&self) -> bool {
        !(self.slots[0].is_none() && self.slots[1].is_some())
    }
}

impl<T: Copy + PartialEq> Default for Slots<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl Slots<Item> {
    /// Finds the slot holding the item with the given id.
    pub fn find_item(&self, item_id: ItemId) -> Option<usize> {
        self.position(|item| item.id == item_id)
    }
}
