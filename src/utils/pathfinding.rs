//! # Pathfinding Worker Pool
//!
//! A race of bounded random walks. Each worker starts in the player's room
//! and steps to a uniformly random neighbour until it reaches the target or
//! runs out of step budget. All workers are joined; the shortest successful
//! walk wins, ties going to the lowest worker index.
//!
//! Workers only read an [`Adjacency`] handle taken from the graph, so the
//! game lock is not held while they run.

use crate::config::{MAX_PATHFINDING_WORKERS, WALK_STEP_BUDGET};
use crate::game::{Adjacency, Rejection, RoomId};
use crate::{WarrenError, WarrenResult};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

/// The rooms one worker visited, starting room first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    /// Index of the worker that produced this walk
    pub worker: usize,
    pub rooms: Vec<RoomId>,
}

impl Walk {
    /// Number of moves taken.
    pub fn steps(&self) -> usize {
        self.rooms.len().saturating_sub(1)
    }

    pub fn ends_at(&self, room: RoomId) -> bool {
        self.rooms.last() == Some(&room)
    }
}

/// Result of a race.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaceOutcome {
    /// The shortest walk that reached the target
    Found(Walk),
    /// No worker reached the target within the step budget
    Exhausted { workers: usize, step_budget: usize },
}

/// Runs one bounded random walk.
///
/// Stops at the target, after `step_budget` moves, or when `give_up`
/// returns true for the number of moves taken so far.
pub fn random_walk<R: Rng + ?Sized>(
    adjacency: &Adjacency,
    start: RoomId,
    target: RoomId,
    step_budget: usize,
    rng: &mut R,
    mut give_up: impl FnMut(usize) -> bool,
) -> Vec<RoomId> {
    let mut rooms = vec![start];
    let mut current = start;

    while current != target && rooms.len() <= step_budget {
        if give_up(rooms.len() - 1) {
            break;
        }
        match adjacency.random_neighbor(current, rng) {
            Some(next) => {
                current = next;
                rooms.push(next);
            }
            None => break,
        }
    }
    rooms
}

/// A configured race of random-walk workers.
///
/// # Examples
///
/// ```
/// use warren::{Adjacency, PathfinderPool, RaceOutcome};
///
/// let mut adjacency = Adjacency::new(4);
/// adjacency.add_edge_if_absent(0, 1);
/// adjacency.add_edge_if_absent(1, 2);
/// adjacency.add_edge_if_absent(2, 3);
///
/// let pool = PathfinderPool::new(3).unwrap().with_seed(7);
/// match pool.race(&adjacency, 0, 3).unwrap() {
///     RaceOutcome::Found(walk) => assert!(walk.steps() >= 3),
///     RaceOutcome::Exhausted { .. } => unreachable!("a 4-room line is always crossed"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct PathfinderPool {
    workers: usize,
    step_budget: usize,
    seed: u64,
    early_exit: bool,
}

impl PathfinderPool {
    /// Creates a pool of `workers` walkers, `1..=MAX_PATHFINDING_WORKERS`.
    pub fn new(workers: usize) -> Result<Self, Rejection> {
        if !(1..=MAX_PATHFINDING_WORKERS).contains(&workers) {
            return Err(Rejection::WorkerCount {
                requested: workers,
                max: MAX_PATHFINDING_WORKERS,
            });
        }
        Ok(Self {
            workers,
            step_budget: WALK_STEP_BUDGET,
            seed: rand::thread_rng().gen(),
            early_exit: false,
        })
    }

    /// Sets the base seed; worker `i` walks with seed `seed + i`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    /// Lets workers abandon walks that are already longer than the best
    /// walk found so far. The winner is the same with or without it.
    pub fn with_early_exit(mut self, early_exit: bool) -> Self {
        self.early_exit = early_exit;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn step_budget(&self) -> usize {
        self.step_budget
    }

    /// Runs every worker to completion and picks the winner.
    ///
    /// Fails with [`WarrenError::ResourceExhausted`] if a worker thread
    /// cannot be spawned.
    pub fn race(&self, adjacency: &Adjacency, start: RoomId, target: RoomId) -> WarrenResult<RaceOutcome> {
        if start >= adjacency.vertex_count() || target >= adjacency.vertex_count() {
            return Err(WarrenError::InvalidAction(format!(
                "rooms {} and {} are not both on a {}-room map",
                start,
                target,
                adjacency.vertex_count()
            )));
        }

        let best = AtomicUsize::new(usize::MAX);
        let walks = thread::scope(|scope| -> WarrenResult<Vec<Walk>> {
            let mut handles = Vec::with_capacity(self.workers);
            for worker in 0..self.workers {
                let best = &best;
                let seed = self.seed.wrapping_add(worker as u64);
                let handle = thread::Builder::new()
                    .name(format!("pathfinder-{}", worker))
                    .spawn_scoped(scope, move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        let rooms = random_walk(adjacency, start, target, self.step_budget, &mut rng, |steps| {
                            self.early_exit && steps > best.load(Ordering::Relaxed)
                        });
                        let walk = Walk { worker, rooms };
                        if self.reached(&walk, target) {
                            best.fetch_min(walk.steps(), Ordering::Relaxed);
                        }
                        walk
                    })
                    .map_err(|e| {
                        WarrenError::ResourceExhausted(format!("cannot spawn pathfinder {}: {}", worker, e))
                    })?;
                handles.push(handle);
            }

            handles
                .into_iter()
                .map(|handle| {
                    handle
                        .join()
                        .map_err(|_| WarrenError::InvalidState("a pathfinder worker panicked".to_string()))
                })
                .collect()
        })?;

        Ok(self.reduce(walks, target))
    }

    /// A walk counts only if it ends at `target` in fewer moves than the
    /// budget; one that needs the whole budget is a failure.
    fn reached(&self, walk: &Walk, target: RoomId) -> bool {
        walk.ends_at(target) && walk.steps() < self.step_budget
    }

    /// Picks the strictly shortest walk that reached `target`.
    fn reduce(&self, walks: Vec<Walk>, target: RoomId) -> RaceOutcome {
        let finished = walks.iter().filter(|walk| self.reached(walk, target)).count();
        let winner = walks
            .into_iter()
            .filter(|walk| self.reached(walk, target))
            .min_by_key(|walk| (walk.steps(), walk.worker));

        debug!(
            "{} of {} pathfinders reached room {}",
            finished, self.workers, target
        );

        match winner {
            Some(walk) => RaceOutcome::Found(walk),
            None => RaceOutcome::Exhausted {
                workers: self.workers,
                step_budget: self.step_budget,
            },
        }
    }
}
