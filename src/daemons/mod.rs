//! # Daemons
//!
//! Long-lived background tasks that run alongside the dispatcher for the
//! length of a session. Each one waits on a single suspension point and
//! watches a [`Shutdown`] token there; when the token fires it logs its
//! shutdown and returns. A daemon is never stopped while holding the game
//! lock.

pub mod autosave;
pub mod signals;

pub use autosave::*;
pub use signals::*;

use crate::{WarrenError, WarrenResult};
use std::future::Future;
use tokio::sync::watch;
use tokio::task::{JoinError, JoinHandle};

/// Receiving side of a cooperative cancellation request.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Resolves once shutdown has been requested or the trigger is gone.
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow() {
                return;
            }
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }

    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }
}

/// Sending side of a cancellation request.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Asks every subscribed daemon to stop.
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn subscribe(&self) -> Shutdown {
        Shutdown {
            rx: self.tx.subscribe(),
        }
    }
}

/// Creates a fresh, untriggered cancellation pair.
pub fn shutdown_channel() -> (ShutdownTrigger, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, Shutdown { rx })
}

/// A spawned daemon task.
#[derive(Debug)]
pub struct DaemonHandle {
    name: &'static str,
    task: Option<JoinHandle<WarrenResult<()>>>,
}

impl DaemonHandle {
    /// Spawns `daemon` onto the current runtime.
    pub fn spawn<F>(name: &'static str, daemon: F) -> Self
    where
        F: Future<Output = WarrenResult<()>> + Send + 'static,
    {
        Self {
            name,
            task: Some(tokio::spawn(daemon)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Waits until the daemon stops on its own.
    ///
    /// Never resolves again once the result has been taken, so it can sit
    /// in a `select!` loop.
    pub async fn finished(&mut self) -> WarrenResult<()> {
        match self.task.as_mut() {
            Some(task) => {
                let result = task.await;
                self.task = None;
                Self::flatten(self.name, result)
            }
            None => std::future::pending().await,
        }
    }

    /// Waits for the daemon to finish after shutdown was requested.
    pub async fn join(mut self) -> WarrenResult<()> {
        match self.task.take() {
            Some(task) => Self::flatten(self.name, task.await),
            None => Ok(()),
        }
    }

    fn flatten(name: &str, result: Result<WarrenResult<()>, JoinError>) -> WarrenResult<()> {
        result.map_err(|e| WarrenError::InvalidState(format!("{} daemon did not finish: {}", name, e)))?
    }
}
