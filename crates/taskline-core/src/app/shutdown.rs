//! Shutdown coordination between the publisher and the workers.
//!
//! `publishing_active` lives in a `watch` channel: the publisher owns the
//! sender, every worker holds a receiver. The flag only ever goes
//! `true -> false`.

use tokio::sync::watch;

/// Owned by the publisher. Dropping it finishes publishing, so a publisher
/// that panics still lets the workers drain and exit.
pub struct ShutdownCoordinator {
    publishing_tx: watch::Sender<bool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (publishing_tx, _) = watch::channel(true);
        Self { publishing_tx }
    }

    /// A receiver view for one worker.
    pub fn subscribe(&self) -> PublishingState {
        PublishingState {
            publishing_rx: self.publishing_tx.subscribe(),
        }
    }

    /// Flip `publishing_active` to false.
    ///
    /// Returns `true` only for the call that performed the transition.
    pub fn finish_publishing(&self) -> bool {
        self.publishing_tx.send_if_modified(|active| {
            if *active {
                *active = false;
                true
            } else {
                false
            }
        })
    }

    pub fn is_publishing(&self) -> bool {
        *self.publishing_tx.borrow()
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ShutdownCoordinator {
    fn drop(&mut self) {
        self.finish_publishing();
    }
}

/// Worker-side view of `publishing_active`.
#[derive(Clone)]
pub struct PublishingState {
    publishing_rx: watch::Receiver<bool>,
}

impl PublishingState {
    pub fn is_active(&self) -> bool {
        *self.publishing_rx.borrow()
    }
}
