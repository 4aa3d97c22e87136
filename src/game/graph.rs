//! # Room Graph
//!
//! Undirected room connectivity plus the per-room item records.
//!
//! Topology lives in an [`Adjacency`] behind an `Arc` so that pathfinding
//! workers can walk it without holding the game lock. Items and destination
//! records live next to it in plain [`Room`] values and are only touched
//! under the lock.

use crate::game::{Item, ItemId, RoomId, Slots};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Neighbour lists for every room, indexed by room id.
///
/// Edges are symmetric, never duplicated and never loop back to the same
/// room. Each list is kept in ascending order so equal edge sets compare
/// equal. Nothing removes an edge once added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Adjacency {
    neighbors: Vec<Vec<RoomId>>,
}

impl Adjacency {
    /// Creates `vertex_count` rooms with no edges.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); vertex_count],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Neighbours of a room, empty for an unknown id.
    pub fn neighbors(&self, room: RoomId) -> &[RoomId] {
        self.neighbors.get(room).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn degree(&self, room: RoomId) -> usize {
        self.neighbors(room).len()
    }

    /// Total number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Checks whether `b` is in `a`'s neighbour list.
    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.neighbors(a).contains(&b)
    }

    /// Inserts the undirected edge `a`-`b` unless it already exists.
    ///
    /// Self-loops and out-of-range ids are ignored. Returns whether an edge
    /// was added.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::Adjacency;
    ///
    /// let mut adjacency = Adjacency::new(4);
    /// assert!(adjacency.add_edge_if_absent(0, 1));
    /// assert!(!adjacency.add_edge_if_absent(1, 0));
    /// assert!(!adjacency.add_edge_if_absent(2, 2));
    /// assert_eq!(adjacency.edge_count(), 1);
    /// ```
    pub fn add_edge_if_absent(&mut self, a: RoomId, b: RoomId) -> bool {
        let count = self.vertex_count();
        if a == b || a >= count || b >= count || self.are_connected(a, b) {
            return false;
        }
        insert_sorted(&mut self.neighbors[a], b);
        insert_sorted(&mut self.neighbors[b], a);
        true
    }

    /// Breadth-first reachability from room 0: true iff every room is reached.
    ///
    /// An empty graph counts as connected.
    pub fn is_fully_connected(&self) -> bool {
        let count = self.vertex_count();
        if count == 0 {
            return true;
        }

        let mut visited = vec![false; count];
        let mut queue = VecDeque::new();
        visited[0] = true;
        queue.push_back(0);

        while let Some(room) = queue.pop_front() {
            for &next in self.neighbors(room) {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }

        visited.into_iter().all(|seen| seen)
    }

    /// Picks a uniformly random neighbour of `room`.
    pub fn random_neighbor<R: Rng + ?Sized>(&self, room: RoomId, rng: &mut R) -> Option<RoomId> {
        let neighbors = self.neighbors(room);
        if neighbors.is_empty() {
            return None;
        }
        Some(neighbors[rng.gen_range(0..neighbors.len())])
    }

    /// Length in edges of the shortest path between two rooms.
    pub fn shortest_path_len(&self, from: RoomId, to: RoomId) -> Option<usize> {
        if from >= self.vertex_count() || to >= self.vertex_count() {
            return None;
        }
        pathfinding::prelude::bfs(&from, |&room| self.neighbors(room).to_vec(), |&room| room == to)
            .map(|path| path.len() - 1)
    }
}

fn insert_sorted(list: &mut Vec<RoomId>, room: RoomId) {
    let index = list.partition_point(|&existing| existing < room);
    list.insert(index, room);
}

/// Item records of a single room.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Items currently lying in the room
    pub items: Slots<Item>,
    /// Ids of items whose destination is this room
    pub assigned: Slots<ItemId>,
}

/// The room graph: shared immutable topology plus mutable room contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomGraph {
    topology: Arc<Adjacency>,
    rooms: Vec<Room>,
}

impl RoomGraph {
    /// Creates a graph of empty, unconnected rooms.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::RoomGraph;
    ///
    /// let mut graph = RoomGraph::new(4);
    /// graph.add_edge_if_absent(0, 1);
    /// graph.add_edge_if_absent(1, 2);
    /// assert!(!graph.is_fully_connected());
    /// graph.add_edge_if_absent(2, 3);
    /// assert!(graph.is_fully_connected());
    /// ```
    pub fn new(vertex_count: usize) -> Self {
        Self::from_adjacency(Adjacency::new(vertex_count))
    }

    /// Wraps existing topology with empty rooms.
    pub fn from_adjacency(adjacency: Adjacency) -> Self {
        let rooms = vec![Room::default(); adjacency.vertex_count()];
        Self {
            topology: Arc::new(adjacency),
            rooms,
        }
    }

    /// Builds a graph from a list of edges.
    pub fn from_edges(vertex_count: usize, edges: &[(RoomId, RoomId)]) -> Self {
        let mut adjacency = Adjacency::new(vertex_count);
        for &(a, b) in edges {
            adjacency.add_edge_if_absent(a, b);
        }
        Self::from_adjacency(adjacency)
    }

    pub fn vertex_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn topology(&self) -> &Adjacency {
        &self.topology
    }

    /// A cheap handle on the topology for readers outside the lock.
    pub fn topology_handle(&self) -> Arc<Adjacency> {
        Arc::clone(&self.topology)
    }

    pub fn contains_room(&self, room: RoomId) -> bool {
        room < self.vertex_count()
    }

    pub fn room(&self, room: RoomId) -> Option<&Room> {
        self.rooms.get(room)
    }

    pub fn room_mut(&mut self, room: RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn are_connected(&self, a: RoomId, b: RoomId) -> bool {
        self.topology.are_connected(a, b)
    }

    /// Inserts an undirected edge unless present.
    ///
    /// Topology is copy-on-write: handles taken earlier with
    /// [`RoomGraph::topology_handle`] keep seeing the old edge set.
    pub fn add_edge_if_absent(&mut self, a: RoomId, b: RoomId) -> bool {
        if self.topology.are_connected(a, b) {
            return false;
        }
        Arc::make_mut(&mut self.topology).add_edge_if_absent(a, b)
    }

    pub fn is_fully_connected(&self) -> bool {
        self.topology.is_fully_connected()
    }

    /// Number of items lying in rooms (not carried).
    pub fn item_count(&self) -> usize {
        self.rooms.iter().map(|room| room.items.len()).sum()
    }

    /// Rooms holding at least one item, in id order.
    pub fn rooms_with_items(&self) -> Vec<RoomId> {
        self.rooms
            .iter()
            .enumerate()
            .filter(|(_, room)| !room.items.is_empty())
            .map(|(id, _)| id)
            .collect()
    }

    /// Finds the room an item currently lies in.
    pub fn locate_item(&self, item_id: ItemId) -> Option<RoomId> {
        self.rooms
            .iter()
            .position(|room| room.items.find_item(item_id).is_some())
    }
}
