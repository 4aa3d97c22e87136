//! # Generation Module
//!
//! Map sources and world population.
//!
//! Maps come from three places: random generation, a directory tree on
//! disk, or a saved map file (see [`crate::game::persistence`]). Every map
//! source produces a connected [`RoomGraph`] that passes
//! [`utils::validate_graph`]; [`spawn_items`] then populates it.

pub mod dir_tree;
pub mod items;
pub mod random;

pub use dir_tree::*;
pub use items::*;
pub use random::*;

use crate::game::RoomGraph;
use crate::WarrenResult;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration for map generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Random seed for reproducible generation
    pub seed: u64,
    /// Number of rooms to generate
    pub vertex_count: usize,
}

impl GenerationConfig {
    /// Creates a configuration for a map of `vertex_count` rooms.
    ///
    /// # Examples
    ///
    /// ```
    /// use warren::GenerationConfig;
    ///
    /// let config = GenerationConfig::new(42, 16);
    /// assert_eq!(config.vertex_count, 16);
    /// ```
    pub fn new(seed: u64, vertex_count: usize) -> Self {
        Self { seed, vertex_count }
    }

    /// Creates a configuration for testing with a small map.
    pub fn for_testing(seed: u64) -> Self {
        Self::new(seed, 8)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self::new(42, 16)
    }
}

/// Common interface for all map sources.
pub trait Generator<T> {
    /// Generates content using the provided configuration and random number generator.
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WarrenResult<T>;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, config: &GenerationConfig) -> WarrenResult<()>;

    /// Gets the generator type name for logging and debugging.
    fn generator_type(&self) -> &'static str;
}

/// Utility functions for generation.
pub mod utils {
    use super::*;
    use crate::config::check_vertex_count;
    use crate::WarrenError;

    /// Creates a seeded random number generator from the config.
    pub fn create_rng(config: &GenerationConfig) -> StdRng {
        StdRng::seed_from_u64(config.seed)
    }

    /// Checks that a map is playable: size within bounds and connected.
    pub fn validate_graph(graph: &RoomGraph) -> WarrenResult<()> {
        check_vertex_count(graph.vertex_count())?;
        if !graph.is_fully_connected() {
            return Err(WarrenError::GenerationFailed(
                "not every room is reachable from room 0".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_config_creation() {
        let config = GenerationConfig::new(7, 32);
        assert_eq!(config.seed, 7);
        assert_eq!(config.vertex_count, 32);
        assert_eq!(GenerationConfig::for_testing(1).vertex_count, 8);
    }

    #[test]
    fn test_utils_rng_is_reproducible() {
        use rand::Rng;
        let config = GenerationConfig::for_testing(5);
        let a: u64 = utils::create_rng(&config).gen();
        let b: u64 = utils::create_rng(&config).gen();
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_graph() {
        let line = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        assert!(utils::validate_graph(&line).is_ok());

        let split = RoomGraph::from_edges(4, &[(0, 1), (2, 3)]);
        assert!(utils::validate_graph(&split).is_err());

        let tiny = RoomGraph::from_edges(3, &[(0, 1), (1, 2)]);
        assert!(utils::validate_graph(&tiny).is_err());
    }
}
