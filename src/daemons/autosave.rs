//! # Autosave Daemon
//!
//! Wakes on a fixed interval and writes the game out once it has gone
//! unsaved for longer than [`AUTOSAVE_AFTER`]. Explicit saves reset the
//! same clock, so they defer the next autosave.

use crate::config::{AUTOSAVE_AFTER, AUTOSAVE_POLL_INTERVAL};
use crate::daemons::{DaemonHandle, Shutdown};
use crate::game::{save_game, SharedGame};
use crate::WarrenResult;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use tokio::time::{self, Duration, MissedTickBehavior};

/// Periodically persists a [`SharedGame`].
#[derive(Debug, Clone)]
pub struct AutosaveDaemon {
    game: SharedGame,
    path: PathBuf,
    poll_interval: Duration,
    save_after: Duration,
}

impl AutosaveDaemon {
    pub fn new(game: SharedGame, path: impl Into<PathBuf>) -> Self {
        Self {
            game,
            path: path.into(),
            poll_interval: AUTOSAVE_POLL_INTERVAL,
            save_after: AUTOSAVE_AFTER,
        }
    }

    /// Overrides the wake-up interval and the idle time before a save.
    pub fn with_timing(mut self, poll_interval: Duration, save_after: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.save_after = save_after;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn spawn(self, shutdown: Shutdown) -> DaemonHandle {
        DaemonHandle::spawn("autosave", self.run(shutdown))
    }

    async fn run(self, mut shutdown: Shutdown) -> WarrenResult<()> {
        info!("Autosave is enabled, saving to {}", self.path.display());

        let mut interval = time::interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                _ = interval.tick() => {}
            }
            self.tick().await;
        }

        info!("Autosave daemon stopped");
        Ok(())
    }

    /// Saves if the game has been idle long enough. Returns whether it saved.
    ///
    /// A failed save is logged and leaves the last-saved time alone, so the
    /// next tick tries again. A tick that finds the game locked is skipped
    /// rather than queued behind the dispatcher.
    pub async fn tick(&self) -> bool {
        let Some(mut state) = self.game.try_lock() else {
            debug!("Game is busy, skipping this autosave poll");
            return false;
        };
        let idle = state.since_last_save();
        if idle <= self.save_after {
            return false;
        }

        debug!("Game unsaved for {:?}, autosaving", idle);
        match save_game(&state, &self.path).await {
            Ok(()) => {
                state.mark_saved();
                info!("Autosaved to {}", self.path.display());
                true
            }
            Err(e) => {
                warn!("Autosave to {} failed: {}", self.path.display(), e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::daemons::shutdown_channel;
    use crate::game::{load_game, GameState, RoomGraph};
    use rand::{rngs::StdRng, SeedableRng};

    fn game() -> SharedGame {
        let graph = RoomGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)]);
        let state = GameState::new_game(graph, &mut StdRng::seed_from_u64(4)).unwrap();
        SharedGame::new(state)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_waits_for_idle_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosave");
        let daemon = AutosaveDaemon::new(game(), &path);

        time::advance(Duration::from_secs(30)).await;
        assert!(!daemon.tick().await);
        assert!(!path.exists());

        time::advance(Duration::from_secs(31)).await;
        assert!(daemon.tick().await);
        assert!(path.exists());

        // Just saved, so the clock starts over.
        assert!(!daemon.tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_explicit_save_defers_autosave() {
        let dir = tempfile::tempdir().unwrap();
        let game = game();
        let daemon = AutosaveDaemon::new(game.clone(), dir.path().join("autosave"));

        time::advance(Duration::from_secs(50)).await;
        game.lock().await.mark_saved();
        time::advance(Duration::from_secs(15)).await;
        assert!(!daemon.tick().await);

        time::advance(Duration::from_secs(50)).await;
        assert!(daemon.tick().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_busy_game_skips_the_poll() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosave");
        let game = game();
        let daemon = AutosaveDaemon::new(game.clone(), &path);
        time::advance(Duration::from_secs(61)).await;

        let guard = game.lock().await;
        assert!(!daemon.tick().await);
        drop(guard);
        assert!(!path.exists());

        assert!(daemon.tick().await);
        assert!(path.exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_save_is_retried() {
        let dir = tempfile::tempdir().unwrap();
        let game = game();
        let daemon = AutosaveDaemon::new(game.clone(), dir.path().join("missing/autosave"));
        let before = game.lock().await.last_saved();

        time::advance(Duration::from_secs(61)).await;
        assert!(!daemon.tick().await);
        assert_eq!(game.lock().await.last_saved(), before);
    }

    #[tokio::test(start_paused = true)]
    async fn test_daemon_saves_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("autosave");
        let game = game();
        let (trigger, shutdown) = shutdown_channel();
        let handle = AutosaveDaemon::new(game.clone(), &path).spawn(shutdown);

        time::sleep(Duration::from_secs(63)).await;
        trigger.trigger();
        handle.join().await.unwrap();

        let saved = load_game(&path).await.unwrap();
        assert_eq!(saved.player, game.lock().await.player);
    }
}
