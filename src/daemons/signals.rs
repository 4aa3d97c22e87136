//! # External Events
//!
//! The event daemon reads interrupts from a channel and answers each
//! `SIGUSR1` by swapping two random items between rooms. On Unix a small
//! forwarder task turns real `SIGUSR1` deliveries into channel messages;
//! the `sigusr1` game command writes to the same channel.

use crate::daemons::{DaemonHandle, Shutdown};
use crate::game::{SharedGame, SwapReport};
use crate::{WarrenError, WarrenResult};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

/// Interrupt kinds that can reach the event daemon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// `SIGUSR1`: swap two items
    User1,
    /// `SIGUSR2`: never sent by anything in the game
    User2,
}

/// One interrupt on its way to the event daemon.
#[derive(Debug)]
pub struct Delivery {
    pub interrupt: Interrupt,
    ack: Option<oneshot::Sender<Option<SwapReport>>>,
}

/// Cloneable sending side of the interrupt channel.
#[derive(Debug, Clone)]
pub struct InterruptSender {
    tx: mpsc::Sender<Delivery>,
}

impl InterruptSender {
    /// Queues an interrupt without waiting for it to be handled.
    pub async fn send(&self, interrupt: Interrupt) -> WarrenResult<()> {
        self.deliver(Delivery { interrupt, ack: None }).await
    }

    /// Queues an interrupt and waits until the daemon has handled it.
    ///
    /// Returns the swap it made, if there was anything to swap.
    pub async fn send_and_wait(&self, interrupt: Interrupt) -> WarrenResult<Option<SwapReport>> {
        let (ack, handled) = oneshot::channel();
        self.deliver(Delivery {
            interrupt,
            ack: Some(ack),
        })
        .await?;
        handled
            .await
            .map_err(|_| WarrenError::InvalidState("event daemon dropped an interrupt".to_string()))
    }

    async fn deliver(&self, delivery: Delivery) -> WarrenResult<()> {
        self.tx
            .send(delivery)
            .await
            .map_err(|_| WarrenError::InvalidState("event daemon is not running".to_string()))
    }
}

/// Creates the channel between interrupt sources and the event daemon.
pub fn interrupt_channel(capacity: usize) -> (InterruptSender, mpsc::Receiver<Delivery>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (InterruptSender { tx }, rx)
}

/// Swaps items whenever a `SIGUSR1` arrives.
#[derive(Debug)]
pub struct EventDaemon {
    game: SharedGame,
    interrupts: mpsc::Receiver<Delivery>,
    rng: StdRng,
}

impl EventDaemon {
    pub fn new(game: SharedGame, interrupts: mpsc::Receiver<Delivery>) -> Self {
        Self {
            game,
            interrupts,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn spawn(self, shutdown: Shutdown) -> DaemonHandle {
        DaemonHandle::spawn("event", self.run(shutdown))
    }

    async fn run(mut self, mut shutdown: Shutdown) -> WarrenResult<()> {
        info!("Waiting for SIGUSR1 to shuffle items");

        let result = loop {
            let delivery = tokio::select! {
                biased;
                _ = shutdown.wait() => break Ok(()),
                delivery = self.interrupts.recv() => delivery,
            };
            let Some(delivery) = delivery else {
                break Ok(());
            };
            if let Err(e) = self.handle(delivery).await {
                break Err(e);
            }
        };

        info!("Event daemon stopped");
        result
    }

    /// Handles one interrupt. Anything but `SIGUSR1` is a protocol violation.
    pub async fn handle(&mut self, delivery: Delivery) -> WarrenResult<Option<SwapReport>> {
        if delivery.interrupt != Interrupt::User1 {
            return Err(WarrenError::ProtocolViolation(format!(
                "unexpected interrupt {:?}",
                delivery.interrupt
            )));
        }

        let outcome = {
            let mut state = self.game.lock().await;
            state.swap_random_pair(&mut self.rng)
        };

        let report = match outcome {
            Ok(report) => {
                info!(
                    "Swapped item {} in room {} with item {} in room {}",
                    report.first_item.id, report.first_room, report.second_item.id, report.second_room
                );
                Some(report)
            }
            Err(rejection) => {
                warn!("Ignoring SIGUSR1: {}", rejection);
                None
            }
        };

        if let Some(ack) = delivery.ack {
            let _ = ack.send(report);
        }
        Ok(report)
    }
}

/// Forwards real `SIGUSR1` deliveries into the interrupt channel.
#[cfg(unix)]
pub fn forward_os_signals(sender: InterruptSender, mut shutdown: Shutdown) -> WarrenResult<DaemonHandle> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut user1 = signal(SignalKind::user_defined1())?;
    Ok(DaemonHandle::spawn("signal forwarder", async move {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.wait() => break,
                received = user1.recv() => {
                    if received.is_none() {
                        break;
                    }
                    debug!("SIGUSR1 received");
                    if let Err(e) = sender.send(Interrupt::User1).await {
                        warn!("Dropping SIGUSR1: {}", e);
                        break;
                    }
                }
            }
        }
        debug!("Signal forwarder stopped");
        Ok(())
    }))
}
