//! Interval poll backing the unread badge.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace, warn};

use super::unread::UnreadCounter;
use crate::client::SyncClient;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Handle to the running badge poll. Dropping it aborts the task, so an
/// in-flight poll never lands after teardown.
pub struct BadgePoller {
    shutdown_tx: watch::Sender<bool>,
    handle: Option<JoinHandle<()>>,
}

impl BadgePoller {
    /// Poll `unread-count` every `every`, starting immediately.
    pub fn spawn(client: Arc<dyn SyncClient>, counter: UnreadCounter, every: Duration) -> Self {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_rx.changed() => {
                        debug!("Badge poller shutdown requested");
                        break;
                    }
                }

                let ticket = counter.ticket();
                let polled = tokio::select! {
                    polled = client.unread_count() => polled,
                    _ = shutdown_rx.changed() => break,
                };

                match polled {
                    Ok(count) => {
                        if counter.publish_polled(ticket, count) {
                            trace!(count, "Unread count polled");
                        } else {
                            debug!(count, "Discarding stale unread poll");
                        }
                    }
                    // keep showing the last known count
                    Err(e) => warn!(error = %e, "Unread count poll failed"),
                }
            }
        });

        Self {
            shutdown_tx,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal shutdown and wait for the task to exit.
    pub async fn stop(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Badge poller task ended abnormally");
            }
        }
    }
}

impl Drop for BadgePoller {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}
