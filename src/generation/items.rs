//! # Item Spawning
//!
//! Populates a fresh map with `floor(3N/2)` items. Each item gets a
//! destination room (at most two per room) and is placed in a different
//! room with a free slot.

use crate::game::{Item, ItemId, Room, RoomGraph, RoomId};
use crate::{WarrenError, WarrenResult};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

/// Number of items a map of `vertex_count` rooms is populated with.
pub fn item_count_for(vertex_count: usize) -> usize {
    vertex_count * 3 / 2
}

/// Spawns items into an empty map and returns how many were created.
///
/// Rooms are drawn uniformly among those that still have room: first for
/// the destination, then for the spawn location (never the destination).
pub fn spawn_items<R: Rng + ?Sized>(graph: &mut RoomGraph, rng: &mut R) -> WarrenResult<usize> {
    if graph.item_count() > 0 {
        return Err(WarrenError::GenerationFailed(
            "items can only be spawned into an empty map".to_string(),
        ));
    }

    let count = item_count_for(graph.vertex_count());
    for index in 0..count {
        let id = index as ItemId;

        let destination = pick_room(graph, rng, |_, room| !room.assigned.is_full())?;
        let spawn = pick_room(graph, rng, |room_id, room| {
            room_id != destination && !room.items.is_full()
        })?;

        if let Some(room) = graph.room_mut(destination) {
            let _ = room.assigned.push(id);
        }
        if let Some(room) = graph.room_mut(spawn) {
            let _ = room.items.push(Item::new(id, destination));
        }
    }

    debug!("Spawned {} items into {} rooms", count, graph.vertex_count());
    Ok(count)
}

fn pick_room<R, F>(graph: &RoomGraph, rng: &mut R, accept: F) -> WarrenResult<RoomId>
where
    R: Rng + ?Sized,
    F: Fn(RoomId, &Room) -> bool,
{
    let candidates: Vec<RoomId> = graph
        .rooms()
        .iter()
        .enumerate()
        .filter(|(id, room)| accept(*id, *room))
        .map(|(id, _)| id)
        .collect();

    candidates
        .choose(rng)
        .copied()
        .ok_or_else(|| WarrenError::GenerationFailed("no room left for an item".to_string()))
}
