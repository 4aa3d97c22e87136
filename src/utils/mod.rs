//! # Utilities Module
//!
//! Search helpers that run outside the game lock.

pub mod pathfinding;

pub use pathfinding::*;
