use tokio::sync::watch;

/// Owner of the "still active" flag for a session manager instance.
pub struct Lifecycle {
    alive_tx: watch::Sender<bool>,
}

impl Lifecycle {
    pub fn new() -> Self {
        let (alive_tx, _) = watch::channel(true);
        Self { alive_tx }
    }

    /// Handle to pass into an asynchronous continuation.
    pub fn guard(&self) -> LivenessGuard {
        LivenessGuard {
            alive_rx: self.alive_tx.subscribe(),
        }
    }

    pub fn is_alive(&self) -> bool {
        *self.alive_tx.borrow()
    }

    /// Flip the flag. Returns `true` only for the call that did the flip.
    pub fn teardown(&self) -> bool {
        let was_alive = self.alive_tx.send_replace(false);
        if was_alive {
            log::info!("Session lifecycle torn down, notifying continuations");
        }
        was_alive
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

/// Checked by every continuation before it writes state.
#[derive(Clone)]
pub struct LivenessGuard {
    alive_rx: watch::Receiver<bool>,
}

impl LivenessGuard {
    pub fn is_alive(&self) -> bool {
        *self.alive_rx.borrow()
    }

    /// Resolves once the owning lifecycle is torn down (or dropped).
    pub async fn torn_down(&mut self) {
        let _ = self.alive_rx.wait_for(|alive| !*alive).await;
    }
}
