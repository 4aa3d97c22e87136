//! # Actions
//!
//! The four mutations of [`GameState`]. Each one checks its preconditions
//! first and either applies the whole change or returns a [`Rejection`]
//! with the state untouched. Callers hold the game lock.

use crate::game::{GameState, Item, ItemId, RoomId};
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

/// Why a player command was refused. None of these are fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Rooms {from} and {to} are not connected")]
    NotConnected { from: RoomId, to: RoomId },

    #[error("Room {room} does not exist")]
    NoSuchRoom { room: RoomId },

    #[error("Item {item} not found in room {room}")]
    ItemNotInRoom { item: ItemId, room: RoomId },

    #[error("Item {item} not found in player's inventory")]
    ItemNotCarried { item: ItemId },

    #[error("Player's inventory is full")]
    InventoryFull,

    #[error("Room {room} is full")]
    RoomFull { room: RoomId },

    #[error("Worker count must be between 1 and {max}, got {requested}")]
    WorkerCount { requested: usize, max: usize },

    #[error("Fewer than two rooms hold items; nothing to swap")]
    NothingToSwap,
}

/// Outcome of [`GameState::swap_random_pair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReport {
    pub first_room: RoomId,
    /// The item that moved from `first_room` to `second_room`
    pub first_item: Item,
    pub second_room: RoomId,
    /// The item that moved from `second_room` to `first_room`
    pub second_item: Item,
}

impl GameState {
    /// Moves the player to an adjacent room.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::{GameState, Player, Rejection, RoomGraph};
    ///
    /// let graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
    /// let mut state = GameState::new(graph, Player::new(0));
    ///
    /// assert_eq!(state.move_player(2), Err(Rejection::NotConnected { from: 0, to: 2 }));
    /// assert_eq!(state.move_player(1), Ok(1));
    /// assert_eq!(state.player.location, 1);
    /// ```
    pub fn move_player(&mut self, target: RoomId) -> Result<RoomId, Rejection> {
        let current = self.player.location;
        if !self.graph.contains_room(target) {
            return Err(Rejection::NoSuchRoom { room: target });
        }
        if !self.graph.are_connected(current, target) {
            return Err(Rejection::NotConnected {
                from: current,
                to: target,
            });
        }
        self.player.location = target;
        Ok(target)
    }

    /// Moves an item from the current room into the inventory.
    pub fn pick_up(&mut self, item_id: ItemId) -> Result<Item, Rejection> {
        let room_id = self.player.location;
        let room = self
            .graph
            .room_mut(room_id)
            .ok_or(Rejection::NoSuchRoom { room: room_id })?;

        let slot = room.items.find_item(item_id).ok_or(Rejection::ItemNotInRoom {
            item: item_id,
            room: room_id,
        })?;
        if self.player.inventory.is_full() {
            return Err(Rejection::InventoryFull);
        }

        let item = room.items.remove(slot).ok_or(Rejection::ItemNotInRoom {
            item: item_id,
            room: room_id,
        })?;
        // Capacity was checked above, so the push cannot hand the item back.
        let _ = self.player.inventory.push(item);
        Ok(item)
    }

    /// Moves an item from the inventory into the current room.
    pub fn drop_item(&mut self, item_id: ItemId) -> Result<Item, Rejection> {
        let room_id = self.player.location;
        let slot = self
            .player
            .inventory
            .find_item(item_id)
            .ok_or(Rejection::ItemNotCarried { item: item_id })?;

        let room = self
            .graph
            .room_mut(room_id)
            .ok_or(Rejection::NoSuchRoom { room: room_id })?;
        if room.items.is_full() {
            return Err(Rejection::RoomFull { room: room_id });
        }

        let item = self
            .player
            .inventory
            .remove(slot)
            .ok_or(Rejection::ItemNotCarried { item: item_id })?;
        let _ = room.items.push(item);
        Ok(item)
    }

    /// Swaps one random item between two distinct random rooms that hold items.
    ///
    /// Rooms are drawn uniformly from those holding at least one item, then
    /// one item uniformly from each. Item identities and destinations travel
    /// together; slot positions stay where they were.
    pub fn swap_random_pair<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<SwapReport, Rejection> {
        let candidates = self.graph.rooms_with_items();
        if candidates.len() < 2 {
            return Err(Rejection::NothingToSwap);
        }

        let picked: Vec<RoomId> = candidates.choose_multiple(rng, 2).copied().collect();
        let (first_room, second_room) = (picked[0], picked[1]);

        let first_len = self.room_item_count(first_room);
        let second_len = self.room_item_count(second_room);
        let first_slot = rng.gen_range(0..first_len);
        let second_slot = rng.gen_range(0..second_len);

        let first_item = self
            .room_item(first_room, first_slot)
            .ok_or(Rejection::NothingToSwap)?;
        let second_item = self
            .room_item(second_room, second_slot)
            .ok_or(Rejection::NothingToSwap)?;

        if let Some(room) = self.graph.room_mut(first_room) {
            room.items.replace(first_slot, second_item);
        }
        if let Some(room) = self.graph.room_mut(second_room) {
            room.items.replace(second_slot, first_item);
        }

        Ok(SwapReport {
            first_room,
            first_item,
            second_room,
            second_item,
        })
    }

    fn room_item_count(&self, room: RoomId) -> usize {
        self.graph.room(room).map(|room| room.items.len()).unwrap_or(0)
    }

    fn room_item(&self, room: RoomId, slot: usize) -> Option<Item> {
        self.graph.room(room)?.items.get(slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Player, RoomGraph};
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn line_state() -> GameState {
        let graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        GameState::new(graph, Player::new(0))
    }

    fn place(state: &mut GameState, room: RoomId, item: Item) {
        state.graph.room_mut(room).unwrap().items.push(item).unwrap();
    }

    fn all_compacted(state: &GameState) -> bool {
        state.player.inventory.is_compacted()
            && state
                .graph
                .rooms()
                .iter()
                .all(|room| room.items.is_compacted() && room.assigned.is_compacted())
    }

    #[test]
    fn test_move_to_non_adjacent_room_is_rejected() {
        let mut state = line_state();
        let before = state.clone();

        assert_eq!(
            state.move_player(2),
            Err(Rejection::NotConnected { from: 0, to: 2 })
        );
        assert_eq!(state.player, before.player);
        assert_eq!(state.graph, before.graph);
    }

    #[test]
    fn test_move_to_adjacent_room() {
        let mut state = line_state();
        assert_eq!(state.move_player(1), Ok(1));
        assert_eq!(state.player.location, 1);
    }

    #[test]
    fn test_move_to_unknown_room() {
        let mut state = line_state();
        assert_eq!(state.move_player(40), Err(Rejection::NoSuchRoom { room: 40 }));
        assert_eq!(state.move_player(0), Err(Rejection::NotConnected { from: 0, to: 0 }));
    }

    #[test]
    fn test_pick_up_compacts_room() {
        let mut state = line_state();
        place(&mut state, 1, Item::new(3, 2));
        place(&mut state, 1, Item::new(4, 0));
        state.move_player(1).unwrap();

        assert_eq!(state.pick_up(3), Ok(Item::new(3, 2)));
        assert_eq!(state.player.inventory.get(0), Some(Item::new(3, 2)));

        let room = state.graph.room(1).unwrap();
        assert_eq!(room.items.get(0), Some(Item::new(4, 0)));
        assert_eq!(room.items.get(1), None);
    }

    #[test]
    fn test_pick_up_rejections() {
        let mut state = line_state();
        place(&mut state, 0, Item::new(1, 2));
        place(&mut state, 0, Item::new(2, 2));
        state.player.inventory.push(Item::new(7, 1)).unwrap();
        state.player.inventory.push(Item::new(8, 1)).unwrap();

        assert_eq!(
            state.pick_up(5),
            Err(Rejection::ItemNotInRoom { item: 5, room: 0 })
        );
        assert_eq!(state.pick_up(1), Err(Rejection::InventoryFull));
        assert_eq!(state.graph.room(0).unwrap().items.len(), 2);
    }

    #[test]
    fn test_drop_compacts_inventory() {
        let mut state = line_state();
        state.player.inventory.push(Item::new(1, 3)).unwrap();
        state.player.inventory.push(Item::new(2, 1)).unwrap();

        assert_eq!(state.drop_item(1), Ok(Item::new(1, 3)));
        assert_eq!(state.player.inventory.get(0), Some(Item::new(2, 1)));
        assert_eq!(state.player.inventory.get(1), None);
        assert_eq!(state.graph.room(0).unwrap().items.get(0), Some(Item::new(1, 3)));
    }

    #[test]
    fn test_drop_rejections() {
        let mut state = line_state();
        place(&mut state, 0, Item::new(1, 2));
        place(&mut state, 0, Item::new(2, 2));
        state.player.inventory.push(Item::new(3, 1)).unwrap();

        assert_eq!(state.drop_item(9), Err(Rejection::ItemNotCarried { item: 9 }));
        assert_eq!(state.drop_item(3), Err(Rejection::RoomFull { room: 0 }));
        assert_eq!(state.player.inventory.len(), 1);
    }

    #[test]
    fn test_swap_exchanges_items_between_rooms() {
        let mut state = line_state();
        place(&mut state, 0, Item::new(10, 2));
        place(&mut state, 3, Item::new(20, 1));
        let mut rng = StdRng::seed_from_u64(3);

        let report = state.swap_random_pair(&mut rng).unwrap();
        let rooms = [report.first_room, report.second_room];
        assert!(rooms.contains(&0) && rooms.contains(&3));

        assert_eq!(state.graph.room(0).unwrap().items.get(0), Some(Item::new(20, 1)));
        assert_eq!(state.graph.room(3).unwrap().items.get(0), Some(Item::new(10, 2)));
        assert_eq!(state.total_item_count(), 2);
    }

    #[test]
    fn test_swap_needs_two_rooms_with_items() {
        let mut state = line_state();
        place(&mut state, 1, Item::new(1, 0));
        place(&mut state, 1, Item::new(2, 0));
        let before = state.graph.clone();
        let mut rng = StdRng::seed_from_u64(3);

        assert_eq!(state.swap_random_pair(&mut rng), Err(Rejection::NothingToSwap));
        assert_eq!(state.graph, before);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(RoomId),
        PickUp(ItemId),
        Drop(ItemId),
        Swap(u64),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..6).prop_map(Op::Move),
            (0u32..10).prop_map(Op::PickUp),
            (0u32..10).prop_map(Op::Drop),
            any::<u64>().prop_map(Op::Swap),
        ]
    }

    proptest! {
        #[test]
        fn prop_actions_conserve_and_compact(seed in any::<u64>(), ops in prop::collection::vec(op_strategy(), 0..60)) {
            let graph = RoomGraph::from_edges(6, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 0), (1, 4)]);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = GameState::new_game(graph, &mut rng).unwrap();
            let expected = state.expected_item_count();

            for op in ops {
                let before = state.clone();
                let outcome = match op {
                    Op::Move(room) => state.move_player(room).map(|_| ()),
                    Op::PickUp(item) => state.pick_up(item).map(|_| ()),
                    Op::Drop(item) => state.drop_item(item).map(|_| ()),
                    Op::Swap(seed) => state
                        .swap_random_pair(&mut StdRng::seed_from_u64(seed))
                        .map(|_| ()),
                };
                if outcome.is_err() {
                    prop_assert_eq!(&state.player, &before.player);
                    prop_assert_eq!(&state.graph, &before.graph);
                }
                prop_assert_eq!(state.total_item_count(), expected);
                prop_assert!(all_compacted(&state));
            }
        }

        #[test]
        fn prop_swap_moves_exactly_two_items(seed in any::<u64>()) {
            let graph = RoomGraph::from_edges(8, &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (5, 6), (6, 7)]);
            let mut rng = StdRng::seed_from_u64(seed);
            let mut state = GameState::new_game(graph, &mut rng).unwrap();
            let before = state.graph.clone();

            let report = state.swap_random_pair(&mut rng).unwrap();
            prop_assert_ne!(report.first_room, report.second_room);

            let moved: Vec<ItemId> = (0..state.expected_item_count() as ItemId)
                .filter(|&id| before.locate_item(id) != state.graph.locate_item(id))
                .collect();
            prop_assert_eq!(moved.len(), 2);
            prop_assert_eq!(state.graph.locate_item(report.first_item.id), Some(report.second_room));
            prop_assert_eq!(state.graph.locate_item(report.second_item.id), Some(report.first_room));
            prop_assert_eq!(state.graph.item_count(), before.item_count());
        }
    }
}
