//! Push-style view over the polled status flag.
//!
//! Polling stays the external contract: a background task re-reads the store on a
//! fixed interval and publishes each change on a `tokio::sync::watch` channel.

use lathe_training::{TrainingStatus, TrainingStatusStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

pub struct StatusPoller {
    store: Arc<dyn TrainingStatusStore>,
    interval: Duration,
}

impl StatusPoller {
    #[must_use]
    pub fn new(store: Arc<dyn TrainingStatusStore>, interval: Duration) -> Self {
        Self { store, interval }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling on the current tokio runtime.
    ///
    /// The first poll happens immediately. Failed polls are logged and publish nothing,
    /// so subscribers keep the last known status.
    #[must_use]
    pub fn spawn(self) -> StatusWatch {
        let (tx, rx) = watch::channel(None);

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        match self.store.get() {
                            Ok(status) => {
                                tx.send_if_modified(|current| {
                                    if *current == Some(status) {
                                        false
                                    } else {
                                        tracing::debug!(%status, "training status changed");
                                        *current = Some(status);
                                        true
                                    }
                                });
                            }
                            Err(e) => tracing::warn!(error = %e, "training status poll failed"),
                        }
                    }
                    () = tx.closed() => break,
                }
            }
        });

        StatusWatch { rx, handle }
    }
}

/// Live subscription to a [`StatusPoller`]. Dropping it stops the poll task.
pub struct StatusWatch {
    rx: watch::Receiver<Option<TrainingStatus>>,
    handle: JoinHandle<()>,
}

impl StatusWatch {
    /// Additional receiver for the same status stream. `None` until the first successful poll.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<TrainingStatus>> {
        self.rx.clone()
    }

    /// Last published status.
    #[must_use]
    pub fn current(&self) -> Option<TrainingStatus> {
        *self.rx.borrow()
    }

    /// Wait for the next published status. `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<TrainingStatus> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(status) = *self.rx.borrow_and_update() {
                return Some(status);
            }
        }
    }
}

impl Drop for StatusWatch {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
