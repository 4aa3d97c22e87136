//! # Game State Module
//!
//! Central game state and the shared handle every background task uses.
//!
//! [`GameState`] owns the room graph, the player and the last-save instant.
//! [`SharedGame`] bundles it with its lock, so the only way to reach the
//! graph's item records or the player from another task is through a
//! [`tokio::sync::MutexGuard`].

use crate::game::{Item, RoomGraph, RoomId, Slots};
use crate::generation::spawn_items;
use crate::WarrenResult;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::{Duration, Instant};

/// The player: where they stand and what they carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Current room
    pub location: RoomId,
    /// Up to two carried items
    pub inventory: Slots<Item>,
}

impl Player {
    /// Creates a player with an empty inventory.
    pub fn new(location: RoomId) -> Self {
        Self {
            location,
            inventory: Slots::new(),
        }
    }
}

/// Everything a play session mutates.
///
/// All fields are plain data; synchronisation is provided by [`SharedGame`].
#[derive(Debug, Clone)]
pub struct GameState {
    /// Rooms, their connections and the items lying in them
    pub graph: RoomGraph,
    /// The player
    pub player: Player,
    /// When the state was last written out
    last_saved: Instant,
}

impl GameState {
    /// Assembles a state from an already populated graph and player.
    pub fn new(graph: RoomGraph, player: Player) -> Self {
        Self {
            graph,
            player,
            last_saved: Instant::now(),
        }
    }

    /// Starts a fresh game on a map: random start room, items spawned.
    ///
    /// # Examples
    ///
    /// ```
    /// use rand::{rngs::StdRng, SeedableRng};
    /// use warren::{GameState, RoomGraph};
    ///
    /// let graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
    /// let mut rng = StdRng::seed_from_u64(1);
    /// let state = GameState::new_game(graph, &mut rng).unwrap();
    /// assert_eq!(state.total_item_count(), 6);
    /// ```
    pub fn new_game<R: Rng + ?Sized>(mut graph: RoomGraph, rng: &mut R) -> WarrenResult<Self> {
        let location = rng.gen_range(0..graph.vertex_count().max(1));
        spawn_items(&mut graph, rng)?;
        Ok(Self::new(graph, Player::new(location)))
    }

    /// Items the world was populated with: `floor(3N/2)`.
    pub fn expected_item_count(&self) -> usize {
        self.graph.vertex_count() * 3 / 2
    }

    /// Items in rooms plus items carried.
    pub fn total_item_count(&self) -> usize {
        self.graph.item_count() + self.player.inventory.len()
    }

    pub fn last_saved(&self) -> Instant {
        self.last_saved
    }

    /// Time since the state was last written out.
    pub fn since_last_save(&self) -> Duration {
        self.last_saved.elapsed()
    }

    /// Records that a save just completed.
    pub fn mark_saved(&mut self) {
        self.last_saved = Instant::now();
    }
}

/// The lock-bundled handle shared by the dispatcher and the daemons.
///
/// Cloning is cheap; every clone guards the same state.
#[derive(Debug, Clone)]
pub struct SharedGame {
    inner: Arc<Mutex<GameState>>,
}

impl SharedGame {
    /// Wraps a state for sharing.
    pub fn new(state: GameState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    /// Waits for exclusive access to the state.
    pub async fn lock(&self) -> MutexGuard<'_, GameState> {
        self.inner.lock().await
    }

    /// Takes the lock only if nobody else holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, GameState>> {
        self.inner.try_lock().ok()
    }

    /// Clones the state under the lock.
    pub async fn snapshot(&self) -> GameState {
        self.lock().await.clone()
    }

    /// Unwraps the state once no other handle is alive.
    pub fn try_into_inner(self) -> Result<GameState, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
