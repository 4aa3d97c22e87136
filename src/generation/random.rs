//! # Random Map Generation
//!
//! Generate-and-test: keep adding random edges until room 0 reaches every
//! other room. There is no fixed bound on the number of attempts; for the
//! allowed map sizes it converges quickly in practice.

use crate::config::check_vertex_count;
use crate::game::RoomGraph;
use crate::generation::{utils, GenerationConfig, Generator};
use crate::WarrenResult;
use log::debug;
use rand::rngs::StdRng;
use rand::Rng;

/// Builds connected maps from random edges.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGraphGenerator;

impl RandomGraphGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator<RoomGraph> for RandomGraphGenerator {
    fn generate(&self, config: &GenerationConfig, rng: &mut StdRng) -> WarrenResult<RoomGraph> {
        let count = config.vertex_count;
        check_vertex_count(count)?;

        let mut graph = RoomGraph::new(count);
        let mut attempts = 0u64;
        while !graph.is_fully_connected() {
            graph.add_edge_if_absent(rng.gen_range(0..count), rng.gen_range(0..count));
            attempts += 1;
        }

        debug!(
            "{} connected {} rooms with {} edges after {} attempts",
            self.generator_type(),
            count,
            graph.topology().edge_count(),
            attempts
        );

        self.validate(&graph, config)?;
        Ok(graph)
    }

    fn validate(&self, content: &RoomGraph, _config: &GenerationConfig) -> WarrenResult<()> {
        utils::validate_graph(content)
    }

    fn generator_type(&self) -> &'static str {
        "RandomGraphGenerator"
    }
}
