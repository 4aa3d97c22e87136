//! # State Display
//!
//! Plain-text printers for the player, the map and pathfinding results.
//! Empty item slots are shown as id `-1` with destination `-1`.

use crate::game::{GameState, Item, Player, RoomGraph, RoomId, Slots, EMPTY_SLOT};
use std::io::{self, Write};

/// Id shown for an item slot, `-1` when empty.
pub fn slot_id(slot: Option<Item>) -> i64 {
    slot.map_or(EMPTY_SLOT, |item| i64::from(item.id))
}

/// Destination shown for an item slot, `-1` when empty.
pub fn slot_destination(slot: Option<Item>) -> i64 {
    slot.map_or(EMPTY_SLOT, |item| item.destination as i64)
}

fn write_items<W: Write>(out: &mut W, items: &Slots<Item>) -> io::Result<()> {
    let [first, second] = items.as_array();
    writeln!(
        out,
        "Current items [{} (dest {}), {} (dest {})]",
        slot_id(first),
        slot_destination(first),
        slot_id(second),
        slot_destination(second)
    )
}

pub fn render_player<W: Write>(out: &mut W, player: &Player) -> io::Result<()> {
    writeln!(out, "PLAYER INFO")?;
    writeln!(out)?;
    writeln!(out, "Current position: {}", player.location)?;
    write_items(out, &player.inventory)
}

/// Prints every room with its items, assignments and neighbours.
pub fn render_map<W: Write>(out: &mut W, graph: &RoomGraph, player_location: RoomId) -> io::Result<()> {
    writeln!(out, "MAP INFO")?;
    for (id, room) in graph.rooms().iter().enumerate() {
        writeln!(out)?;
        if id == player_location {
            writeln!(out, "Room ID {} -----> [YOU ARE HERE]", id)?;
        } else {
            writeln!(out, "Room ID {}", id)?;
        }
        write_items(out, &room.items)?;

        let [first, second] = room.assigned.as_array();
        writeln!(
            out,
            "Assigned item ids: [{}, {}]",
            first.map_or(EMPTY_SLOT, i64::from),
            second.map_or(EMPTY_SLOT, i64::from)
        )?;

        let neighbors: Vec<String> = graph
            .topology()
            .neighbors(id)
            .iter()
            .map(|room| room.to_string())
            .collect();
        writeln!(out, "Adjacent rooms: {}", neighbors.join(" "))?;
    }
    Ok(())
}

/// Prints the whole state followed by the item total check.
///
/// # Examples
///
/// ```
/// use warren::{render_game_state, GameState, Player, RoomGraph};
///
/// let state = GameState::new(RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]), Player::new(0));
/// let mut out = Vec::new();
/// render_game_state(&mut out, &state).unwrap();
/// let text = String::from_utf8(out).unwrap();
/// assert!(text.contains("Room ID 0 -----> [YOU ARE HERE]"));
/// assert!(text.contains("ITEMS IN TOTAL: 0 [SHOULD BE 6]"));
/// ```
pub fn render_game_state<W: Write>(out: &mut W, state: &GameState) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "-------- GAME STATE --------")?;
    writeln!(out)?;
    render_player(out, &state.player)?;
    writeln!(out)?;
    render_map(out, &state.graph, state.player.location)?;
    writeln!(out)?;
    writeln!(
        out,
        "ITEMS IN TOTAL: {} [SHOULD BE {}]",
        state.total_item_count(),
        state.expected_item_count()
    )
}

/// Prints a walk as `0->1->2` with its length next to the best possible one.
pub fn render_path<W: Write>(out: &mut W, rooms: &[RoomId], shortest: Option<usize>) -> io::Result<()> {
    let path: Vec<String> = rooms.iter().map(|room| room.to_string()).collect();
    writeln!(out)?;
    writeln!(out, "MODERATELY SHORT PATH:")?;
    writeln!(out, "{}", path.join("->"))?;
    match shortest {
        Some(shortest) => writeln!(
            out,
            "Length: {} (shortest possible: {})",
            rooms.len().saturating_sub(1),
            shortest
        ),
        None => writeln!(out, "Length: {}", rooms.len().saturating_sub(1)),
    }
}
