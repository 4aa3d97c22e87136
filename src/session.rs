//! # Game Session
//!
//! The command dispatcher. A [`Session`] owns one game for its whole
//! lifetime: it starts the autosave and event daemons, reads game commands
//! one at a time, takes the game lock only for the commands that touch
//! shared state, and on `quit` (or end of input) stops both daemons and
//! waits for them before handing the final state back.

use crate::config::{AUTOSAVE_AFTER, AUTOSAVE_POLL_INTERVAL, DEFAULT_AUTOSAVE_PATH, MAX_PATHFINDING_WORKERS};
use crate::daemons::{
    interrupt_channel, shutdown_channel, AutosaveDaemon, DaemonHandle, EventDaemon, Interrupt,
    InterruptSender, ShutdownTrigger,
};
use crate::game::{save_game, GameState, Rejection, SharedGame};
use crate::input::{GameCommand, InputHandler};
use crate::rendering::{render_game_state, render_menu, render_path, report_failure, report_success, GAME_MENU};
use crate::utils::{PathfinderPool, RaceOutcome};
use crate::{WarrenError, WarrenResult};
use log::{debug, info, warn};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufRead;
use tokio::time::Duration;

/// Interrupts that may wait for the event daemon at once.
const INTERRUPT_QUEUE: usize = 16;

/// Per-session settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Where the autosave daemon writes
    pub autosave_path: PathBuf,
    /// Seed for swaps and pathfinding; random when `None`
    pub seed: Option<u64>,
    pub autosave_poll_interval: Duration,
    pub autosave_after: Duration,
    /// Whether real `SIGUSR1` deliveries reach the event daemon
    pub os_signals: bool,
}

impl SessionConfig {
    pub fn new(autosave_path: impl Into<PathBuf>) -> Self {
        Self {
            autosave_path: autosave_path.into(),
            seed: None,
            autosave_poll_interval: AUTOSAVE_POLL_INTERVAL,
            autosave_after: AUTOSAVE_AFTER,
            os_signals: true,
        }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_autosave_timing(mut self, poll_interval: Duration, save_after: Duration) -> Self {
        self.autosave_poll_interval = poll_interval;
        self.autosave_after = save_after;
        self
    }

    pub fn with_os_signals(mut self, os_signals: bool) -> Self {
        self.os_signals = os_signals;
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_PATH)
    }
}

/// A running game with its daemons.
#[derive(Debug)]
pub struct Session {
    game: SharedGame,
    config: SessionConfig,
    interrupts: InterruptSender,
    shutdown: ShutdownTrigger,
    autosave: DaemonHandle,
    events: DaemonHandle,
    forwarder: Option<DaemonHandle>,
    searches: u64,
}

impl Session {
    /// Starts the daemons for `state`. The save clock starts now.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(mut state: GameState, config: SessionConfig) -> WarrenResult<Self> {
        state.mark_saved();
        let game = SharedGame::new(state);
        let (shutdown, token) = shutdown_channel();
        let (interrupts, receiver) = interrupt_channel(INTERRUPT_QUEUE);

        let autosave = AutosaveDaemon::new(game.clone(), &config.autosave_path)
            .with_timing(config.autosave_poll_interval, config.autosave_after)
            .spawn(shutdown.subscribe());

        let mut event_daemon = EventDaemon::new(game.clone(), receiver);
        if let Some(seed) = config.seed {
            event_daemon = event_daemon.with_seed(seed);
        }
        let events = event_daemon.spawn(token);

        let forwarder = if config.os_signals {
            Self::forward_signals(&interrupts, &shutdown)?
        } else {
            None
        };

        info!("Session started, autosaving to {}", config.autosave_path.display());
        Ok(Self {
            game,
            config,
            interrupts,
            shutdown,
            autosave,
            events,
            forwarder,
            searches: 0,
        })
    }

    #[cfg(unix)]
    fn forward_signals(
        interrupts: &InterruptSender,
        shutdown: &ShutdownTrigger,
    ) -> WarrenResult<Option<DaemonHandle>> {
        crate::daemons::forward_os_signals(interrupts.clone(), shutdown.subscribe()).map(Some)
    }

    #[cfg(not(unix))]
    fn forward_signals(
        _interrupts: &InterruptSender,
        _shutdown: &ShutdownTrigger,
    ) -> WarrenResult<Option<DaemonHandle>> {
        warn!("SIGUSR1 is not available on this platform; use the sigusr1 command");
        Ok(None)
    }

    /// The shared state this session runs on.
    pub fn game(&self) -> &SharedGame {
        &self.game
    }

    /// A sender that reaches this session's event daemon.
    pub fn interrupts(&self) -> InterruptSender {
        self.interrupts.clone()
    }

    /// Runs commands until `quit` or end of input, then shuts down.
    ///
    /// Fatal conditions (a failed event daemon, thread exhaustion, I/O
    /// errors on the output) end the session with an error after the
    /// daemons have been stopped.
    pub async fn run<R, W>(mut self, input: &mut InputHandler<R>, out: &mut W) -> WarrenResult<GameState>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let result = self.command_loop(input, out).await;
        let stopped = self.stop().await;
        result?;
        stopped
    }

    async fn command_loop<R, W>(&mut self, input: &mut InputHandler<R>, out: &mut W) -> WarrenResult<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        self.show(out).await?;

        loop {
            let line = tokio::select! {
                biased;
                result = self.events.finished() => {
                    result?;
                    return Err(WarrenError::InvalidState("event daemon stopped unexpectedly".to_string()));
                }
                line = input.next_line() => line?,
            };

            let Some(line) = line else {
                info!("End of input, leaving the game");
                return Ok(());
            };

            let command = match line.parse::<GameCommand>() {
                Ok(command) => command,
                Err(e) => {
                    report_failure(out, e)?;
                    render_menu(out, GAME_MENU)?;
                    continue;
                }
            };
            debug!("Game command: {:?}", command);

            if !self.execute(command, out).await? {
                return Ok(());
            }
            self.show(out).await?;
        }
    }

    /// Runs one command. Returns `false` when the session should end.
    pub async fn execute<W: Write>(&mut self, command: GameCommand, out: &mut W) -> WarrenResult<bool> {
        match command {
            GameCommand::MoveTo(room) => {
                let outcome = self.game.lock().await.move_player(room);
                match outcome {
                    Ok(room) => report_success(out, format!("Moved to {}.", room))?,
                    Err(rejection) => report_failure(out, rejection)?,
                }
            }

            GameCommand::PickUp(item_id) => {
                let outcome = self.game.lock().await.pick_up(item_id);
                match outcome {
                    Ok(item) => report_success(
                        out,
                        format!("Picked up item {} (dest {}).", item.id, item.destination),
                    )?,
                    Err(rejection) => report_failure(out, rejection)?,
                }
            }

            GameCommand::Drop(item_id) => {
                let outcome = self.game.lock().await.drop_item(item_id);
                match outcome {
                    Ok(item) => report_success(out, format!("Dropped item {}.", item.id))?,
                    Err(rejection) => report_failure(out, rejection)?,
                }
            }

            GameCommand::Save(path) => {
                let outcome = {
                    let mut state = self.game.lock().await;
                    let outcome = save_game(&state, &path).await;
                    if outcome.is_ok() {
                        state.mark_saved();
                    }
                    outcome
                };
                match outcome {
                    Ok(()) => report_success(out, format!("Game saved to {}!", path.display()))?,
                    Err(e) => {
                        warn!("Saving to {} failed: {}", path.display(), e);
                        report_failure(out, format!("Could not save the game: {}", e))?
                    }
                }
            }

            GameCommand::FindPath { workers, target } => self.find_path(workers, target, out).await?,

            GameCommand::Signal => match self.interrupts.send_and_wait(Interrupt::User1).await {
                Ok(Some(swap)) => report_success(
                    out,
                    format!(
                        "Swapped item {} from Room ID {} with item {} from Room ID {}.",
                        swap.first_item.id, swap.first_room, swap.second_item.id, swap.second_room
                    ),
                )?,
                Ok(None) => report_failure(out, Rejection::NothingToSwap)?,
                // The daemon is gone; the command loop picks up why.
                Err(e) => warn!("SIGUSR1 was not handled: {}", e),
            },

            GameCommand::Help => render_menu(out, GAME_MENU)?,

            GameCommand::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Races pathfinders from the player's room without holding the lock.
    async fn find_path<W: Write>(&mut self, workers: usize, target: usize, out: &mut W) -> WarrenResult<()> {
        let pool = match PathfinderPool::new(workers) {
            Ok(pool) => pool.with_early_exit(true),
            Err(rejection) => return Ok(report_failure(out, rejection)?),
        };
        let pool = match self.config.seed {
            Some(seed) => pool.with_seed(seed.wrapping_add(self.searches * MAX_PATHFINDING_WORKERS as u64)),
            None => pool,
        };
        self.searches += 1;

        let (topology, start) = {
            let state = self.game.lock().await;
            (state.graph.topology_handle(), state.player.location)
        };
        if target >= topology.vertex_count() {
            return Ok(report_failure(out, Rejection::NoSuchRoom { room: target })?);
        }

        let race = {
            let topology = Arc::clone(&topology);
            tokio::task::spawn_blocking(move || pool.race(&topology, start, target))
        };
        let outcome = race
            .await
            .map_err(|e| WarrenError::InvalidState(format!("pathfinding did not finish: {}", e)))??;

        match outcome {
            RaceOutcome::Found(walk) => {
                info!("Pathfinder {} won with {} steps", walk.worker, walk.steps());
                render_path(out, &walk.rooms, topology.shortest_path_len(start, target))?;
            }
            RaceOutcome::Exhausted { workers, step_budget } => report_failure(
                out,
                format!(
                    "None of the {} threads reached room {} within {} steps.",
                    workers, target, step_budget
                ),
            )?,
        }
        Ok(())
    }

    async fn show<W: Write>(&self, out: &mut W) -> WarrenResult<()> {
        let state = self.game.snapshot().await;
        render_game_state(out, &state)?;
        render_menu(out, GAME_MENU)?;
        Ok(())
    }

    /// Cancels the daemons, waits for all of them and returns the state.
    async fn stop(self) -> WarrenResult<GameState> {
        let Session {
            game,
            interrupts,
            shutdown,
            autosave,
            events,
            forwarder,
            ..
        } = self;

        shutdown.trigger();
        let mut first_error = None;
        for handle in [Some(autosave), Some(events), forwarder].into_iter().flatten() {
            let name = handle.name();
            if let Err(e) = handle.join().await {
                warn!("The {} daemon failed: {}", name, e);
                first_error.get_or_insert(e);
            }
        }
        drop(interrupts);
        info!("Session ended");

        if let Some(e) = first_error {
            return Err(e);
        }
        match game.try_into_inner() {
            Ok(state) => Ok(state),
            Err(game) => Ok(game.snapshot().await),
        }
    }
}
