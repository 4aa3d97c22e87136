//! # Warren
//!
//! A room-graph adventure whose interesting part is the coordination core:
//! one mutable game state shared by a command dispatcher, an autosave
//! daemon, a signal-driven event daemon and a pool of racing pathfinders.
//!
//! ## Architecture Overview
//!
//! - **Game State**: the room graph, the player and the last-save instant,
//!   guarded by a single lock bundled into [`SharedGame`]
//! - **Actions**: move, pick-up, drop and random swap, each all-or-nothing
//! - **Generation**: random connected graphs, directory-tree maps, item spawning
//! - **Pathfinding**: bounded random walks raced across worker threads
//! - **Daemons**: autosave and external-event tasks with cooperative shutdown
//! - **Session**: the dispatcher that owns the daemons for one play session

pub mod daemons;
pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod scenes;
pub mod session;
pub mod utils;

pub use daemons::*;
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use scenes::*;
pub use session::*;
pub use utils::*;

/// Core error type for the Warren engine.
#[derive(thiserror::Error, Debug)]
pub enum WarrenError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// A save or map file was readable but did not describe a valid world
    #[error("Invalid save data: {0}")]
    Persistence(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Action cannot be performed
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Generation failed
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Threads or tasks could not be created
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// An interrupt arrived that nothing is supposed to send
    #[error("Protocol violation: {0}")]
    ProtocolViolation(String),
}

/// Result type used throughout the Warren codebase.
pub type WarrenResult<T> = Result<T, WarrenError>;

/// Version information for the game.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Game configuration constants.
pub mod config {
    use std::time::Duration;

    /// Smallest map a game can be played on
    pub const MIN_VERTEX_COUNT: usize = 4;

    /// Largest map a game can be played on
    pub const MAX_VERTEX_COUNT: usize = 512;

    /// Upper bound on pathfinding workers per `find-path`
    pub const MAX_PATHFINDING_WORKERS: usize = 100;

    /// Steps a single random walk may take before it gives up
    pub const WALK_STEP_BUDGET: usize = 1000;

    /// How often the autosave daemon wakes up
    pub const AUTOSAVE_POLL_INTERVAL: Duration = Duration::from_secs(1);

    /// Minimum time since the last save before the daemon saves again
    pub const AUTOSAVE_AFTER: Duration = Duration::from_secs(60);

    /// Autosave destination when neither `-b` nor `GAME_AUTOSAVE` is given
    pub const DEFAULT_AUTOSAVE_PATH: &str = ".game-autosave";

    /// Checks that a map size is playable.
    pub fn check_vertex_count(vertex_count: usize) -> crate::WarrenResult<()> {
        if !(MIN_VERTEX_COUNT..=MAX_VERTEX_COUNT).contains(&vertex_count) {
            return Err(crate::WarrenError::InvalidState(format!(
                "map must have between {} and {} rooms, got {}",
                MIN_VERTEX_COUNT, MAX_VERTEX_COUNT, vertex_count
            )));
        }
        Ok(())
    }
}
