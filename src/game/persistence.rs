//! # Persistence
//!
//! Save games and map files as JSON.
//!
//! A save captures the player (room and two inventory slots) and, for every
//! room, its two item slots, its two destination slots and its neighbour
//! list. A map file captures topology only. Loading validates everything a
//! running game relies on before handing back a state.
//!
//! Writes go to a `.tmp` sibling that is then renamed over the target, so
//! a failed write leaves the previous file in place.

use crate::config::check_vertex_count;
use crate::game::{Adjacency, GameState, Item, ItemId, Player, Room, RoomGraph, RoomId, Slots};
use crate::generation::item_count_for;
use crate::{WarrenError, WarrenResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: u32,
    pub player: PlayerRecord,
    pub rooms: Vec<RoomRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub location: RoomId,
    pub items: Slots<Item>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub id: RoomId,
    pub items: Slots<Item>,
    pub assigned: Slots<ItemId>,
    pub adjacent: Vec<RoomId>,
}

/// Serializable topology of a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapData {
    pub version: u32,
    pub vertex_count: usize,
    pub adjacent: Vec<Vec<RoomId>>,
}

impl From<&GameState> for SaveData {
    fn from(state: &GameState) -> Self {
        let topology = state.graph.topology();
        let rooms = state
            .graph
            .rooms()
            .iter()
            .enumerate()
            .map(|(id, room)| RoomRecord {
                id,
                items: room.items,
                assigned: room.assigned,
                adjacent: topology.neighbors(id).to_vec(),
            })
            .collect();

        Self {
            version: SAVE_VERSION,
            player: PlayerRecord {
                location: state.player.location,
                items: state.player.inventory,
            },
            rooms,
        }
    }
}

impl SaveData {
    /// Rebuilds a game state, rejecting anything a game could not run on.
    pub fn into_game_state(self) -> WarrenResult<GameState> {
        check_version(self.version)?;
        let count = self.rooms.len();
        check_vertex_count(count).map_err(invalid)?;

        let mut adjacency = Adjacency::new(count);
        for (index, record) in self.rooms.iter().enumerate() {
            if record.id != index {
                return Err(corrupt(format!("room record {} is stored at {}", record.id, index)));
            }
            add_neighbors(&mut adjacency, index, &record.adjacent)?;
        }
        check_symmetric(&adjacency, self.rooms.iter().map(|record| record.adjacent.as_slice()))?;
        check_topology(&adjacency)?;

        check_items(&self)?;

        let mut graph = RoomGraph::from_adjacency(adjacency);
        let mut seen = HashSet::new();
        for record in self.rooms {
            check_slots(&record.items, count, &mut seen)?;
            if !record.assigned.is_compacted() {
                return Err(corrupt(format!("room {} has gapped destination slots", record.id)));
            }
            if let Some(room) = graph.room_mut(record.id) {
                *room = Room {
                    items: record.items,
                    assigned: record.assigned,
                };
            }
        }

        if self.player.location >= count {
            return Err(corrupt(format!("player stands in unknown room {}", self.player.location)));
        }
        check_slots(&self.player.items, count, &mut seen)?;

        Ok(GameState::new(
            graph,
            Player {
                location: self.player.location,
                inventory: self.player.items,
            },
        ))
    }
}

impl From<&Adjacency> for MapData {
    fn from(adjacency: &Adjacency) -> Self {
        Self {
            version: SAVE_VERSION,
            vertex_count: adjacency.vertex_count(),
            adjacent: (0..adjacency.vertex_count())
                .map(|room| adjacency.neighbors(room).to_vec())
                .collect(),
        }
    }
}

impl MapData {
    /// Rebuilds an empty, validated map.
    pub fn into_graph(self) -> WarrenResult<RoomGraph> {
        check_version(self.version)?;
        if self.adjacent.len() != self.vertex_count {
            return Err(corrupt(format!(
                "map declares {} rooms but lists {}",
                self.vertex_count,
                self.adjacent.len()
            )));
        }
        check_vertex_count(self.vertex_count).map_err(invalid)?;

        let mut adjacency = Adjacency::new(self.vertex_count);
        for (room, neighbors) in self.adjacent.iter().enumerate() {
            add_neighbors(&mut adjacency, room, neighbors)?;
        }
        check_symmetric(&adjacency, self.adjacent.iter().map(Vec::as_slice))?;
        check_topology(&adjacency)?;
        Ok(RoomGraph::from_adjacency(adjacency))
    }
}

/// Serializes a game to JSON.
pub fn encode_game(state: &GameState) -> WarrenResult<String> {
    Ok(serde_json::to_string_pretty(&SaveData::from(state))?)
}

/// Parses and validates a game from JSON.
pub fn decode_game(json: &str) -> WarrenResult<GameState> {
    serde_json::from_str::<SaveData>(json)?.into_game_state()
}

/// Writes a game to `path`.
///
/// The caller is expected to hold the game lock for the whole call.
pub async fn save_game(state: &GameState, path: &Path) -> WarrenResult<()> {
    let json = encode_game(state)?;
    write_replacing(path, json.as_bytes()).await
}

/// Reads a game from `path`.
pub async fn load_game(path: &Path) -> WarrenResult<GameState> {
    let json = tokio::fs::read_to_string(path).await?;
    decode_game(&json)
}

/// Writes a map's topology to `path`.
pub async fn save_map(graph: &RoomGraph, path: &Path) -> WarrenResult<()> {
    let json = serde_json::to_string_pretty(&MapData::from(graph.topology()))?;
    write_replacing(path, json.as_bytes()).await
}

/// Reads a map from `path`. Rooms come back empty.
pub async fn read_map(path: &Path) -> WarrenResult<RoomGraph> {
    let json = tokio::fs::read_to_string(path).await?;
    serde_json::from_str::<MapData>(&json)?.into_graph()
}

async fn write_replacing(path: &Path, contents: &[u8]) -> WarrenResult<()> {
    let temp = temp_path(path);
    tokio::fs::write(&temp, contents).await?;
    if let Err(e) = tokio::fs::rename(&temp, path).await {
        let _ = tokio::fs::remove_file(&temp).await;
        return Err(e.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

fn check_version(version: u32) -> WarrenResult<()> {
    if version != SAVE_VERSION {
        return Err(corrupt(format!(
            "unsupported format version {} (expected {})",
            version, SAVE_VERSION
        )));
    }
    Ok(())
}

fn add_neighbors(adjacency: &mut Adjacency, room: RoomId, neighbors: &[RoomId]) -> WarrenResult<()> {
    for &other in neighbors {
        if other >= adjacency.vertex_count() || other == room {
            return Err(corrupt(format!("room {} lists invalid neighbour {}", room, other)));
        }
        adjacency.add_edge_if_absent(room, other);
    }
    Ok(())
}

/// Every edge must be listed from both ends.
fn check_symmetric<'a>(
    adjacency: &Adjacency,
    lists: impl Iterator<Item = &'a [RoomId]>,
) -> WarrenResult<()> {
    for (room, listed) in lists.enumerate() {
        let mut listed = listed.to_vec();
        listed.sort_unstable();
        listed.dedup();
        if listed != adjacency.neighbors(room) {
            return Err(corrupt(format!("room {} has one-way connections", room)));
        }
    }
    Ok(())
}

fn check_topology(adjacency: &Adjacency) -> WarrenResult<()> {
    if !adjacency.is_fully_connected() {
        return Err(corrupt("map is not connected".to_string()));
    }
    Ok(())
}

/// The map holds exactly `floor(3N/2)` items and each one is assigned once,
/// in its destination room.
fn check_items(data: &SaveData) -> WarrenResult<()> {
    let destinations: HashMap<ItemId, RoomId> = data
        .rooms
        .iter()
        .flat_map(|room| room.items.iter())
        .chain(data.player.items.iter())
        .map(|item| (item.id, item.destination))
        .collect();

    let expected = item_count_for(data.rooms.len());
    let held = data.rooms.iter().map(|room| room.items.len()).sum::<usize>() + data.player.items.len();
    if held != expected {
        return Err(corrupt(format!("save holds {} items, expected {}", held, expected)));
    }

    let mut assigned = HashSet::new();
    for room in &data.rooms {
        for id in room.assigned.iter() {
            match destinations.get(&id) {
                Some(&destination) if destination == room.id => {}
                Some(&destination) => {
                    return Err(corrupt(format!(
                        "item {} is assigned to room {} but wants room {}",
                        id, room.id, destination
                    )))
                }
                None => return Err(corrupt(format!("room {} is assigned unknown item {}", room.id, id))),
            }
            if !assigned.insert(id) {
                return Err(corrupt(format!("item {} is assigned twice", id)));
            }
        }
    }
    if let Some(id) = destinations.keys().find(|id| !assigned.contains(*id)) {
        return Err(corrupt(format!("item {} has no assigned destination", id)));
    }
    Ok(())
}

fn check_slots(slots: &Slots<Item>, count: usize, seen: &mut HashSet<ItemId>) -> WarrenResult<()> {
    if !slots.is_compacted() {
        return Err(corrupt("item slots have a gap".to_string()));
    }
    for item in slots.iter() {
        if item.destination >= count {
            return Err(corrupt(format!(
                "item {} wants unknown room {}",
                item.id, item.destination
            )));
        }
        if !seen.insert(item.id) {
            return Err(corrupt(format!("item {} appears twice", item.id)));
        }
    }
    Ok(())
}

fn corrupt(message: String) -> WarrenError {
    WarrenError::Persistence(message)
}

fn invalid(error: WarrenError) -> WarrenError {
    corrupt(error.to_string())
}
