//! Drives a [`Player`] on the current tokio task.

use std::future;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::input::PlayerInput;
use crate::media::MediaElement;
use crate::player::{Player, PlayerView};
use crate::recovery::AbrEngine;

/// Sends inputs to a running [`PlayerRuntime`].
#[derive(Debug, Clone)]
pub struct PlayerHandle {
    tx: mpsc::UnboundedSender<PlayerInput>,
}

impl PlayerHandle {
    /// Returns `false` once the runtime has stopped.
    pub fn send(&self, input: PlayerInput) -> bool {
        self.tx.send(input).is_ok()
    }
}

pub struct PlayerRuntime<M, E> {
    player: Player<M, E>,
    tx: mpsc::UnboundedSender<PlayerInput>,
    rx: mpsc::UnboundedReceiver<PlayerInput>,
    view_tx: watch::Sender<PlayerView>,
    token: CancellationToken,
}

impl<M: MediaElement, E: AbrEngine> PlayerRuntime<M, E> {
    pub fn new(
        player: Player<M, E>,
        token: CancellationToken,
    ) -> (Self, PlayerHandle, watch::Receiver<PlayerView>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (view_tx, view_rx) = watch::channel(player.view());
        let handle = PlayerHandle { tx: tx.clone() };
        let runtime = Self {
            player,
            tx,
            rx,
            view_tx,
            token,
        };
        (runtime, handle, view_rx)
    }

    /// Runs until the token is cancelled and hands the player back.
    ///
    /// Time is measured from the start of the run. Timers are a single sleep
    /// on the earliest deadline, recomputed after every input.
    pub async fn run(mut self) -> Player<M, E> {
        let origin = Instant::now();
        let fullscreen_tx = self.tx.clone();
        let _subscription = self.player.subscribe_fullscreen(Box::new(move |active| {
            let _ = fullscreen_tx.send(PlayerInput::FullscreenChanged(active));
        }));

        loop {
            let deadline = self.player.next_deadline().map(|at| origin + at);
            tokio::select! {
                biased;
                _ = self.token.cancelled() => {
                    debug!("Player runtime cancelled");
                    break;
                }
                input = self.rx.recv() => {
                    let Some(input) = input else { break };
                    if let Err(e) = self.player.handle(input, origin.elapsed()) {
                        warn!(error = %e, "Rejected player input");
                    }
                }
                _ = sleep_until_deadline(deadline) => {
                    self.player.advance(origin.elapsed());
                }
            }
            self.view_tx.send_replace(self.player.view());
        }
        self.player
    }
}

async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => future::pending().await,
    }
}
