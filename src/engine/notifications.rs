//! Detail-side notification list with optimistic read marking.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::unread::UnreadCounter;
use crate::client::{SyncClient, SyncError};
use crate::model::notification::{Notification, NotificationFeed, unread_count};

#[derive(Error, Debug)]
pub enum NotificationError {
    #[error("notification {0} is not in the loaded list")]
    UnknownNotification(String),

    #[error(transparent)]
    Sync(#[from] SyncError),
}

/// Owns the notification list the detail view shows and keeps the shared
/// [`UnreadCounter`] in step with it.
pub struct NotificationCenter {
    client: Arc<dyn SyncClient>,
    counter: UnreadCounter,
    list: RwLock<Vec<Notification>>,
    /// Ids flipped optimistically whose confirm has not come back yet
    confirming: Mutex<HashSet<String>>,
}

impl NotificationCenter {
    pub fn new(client: Arc<dyn SyncClient>, counter: UnreadCounter) -> Self {
        Self {
            client,
            counter,
            list: RwLock::new(Vec::new()),
            confirming: Mutex::new(HashSet::new()),
        }
    }

    pub fn counter(&self) -> &UnreadCounter {
        &self.counter
    }

    /// Replace the list with the server's and publish its unread count.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<NotificationFeed, NotificationError> {
        let notifications = self.client.notifications().await.map_err(|e| {
            error!(error = %e, "Failed to fetch notifications");
            e
        })?;

        let count = unread_count(&notifications);
        *self.list.write() = notifications.clone();
        self.counter.publish(count);
        debug!(total = notifications.len(), unread = count, "Notifications fetched");

        Ok(NotificationFeed {
            notifications,
            unread_count: count,
        })
    }

    /// Mark one notification read, optimistically. If the server does not
    /// confirm, the local flag is reverted and the count re-published.
    ///
    /// A notification that is already read is a no-op, unless another call's
    /// confirm for it is still pending: then this call waits on a confirm of
    /// its own so it can't report success for a mark that later reverts.
    #[instrument(skip(self))]
    pub async fn mark_one(&self, id: &str) -> Result<usize, NotificationError> {
        let (flipped, awaiting_other) = {
            let mut list = self.list.write();
            let notification = list
                .iter_mut()
                .find(|n| n.id == id)
                .ok_or_else(|| NotificationError::UnknownNotification(id.to_string()))?;
            let flipped = !notification.is_read;
            notification.is_read = true;

            let mut confirming = self.confirming.lock();
            if flipped {
                confirming.insert(id.to_string());
            }
            (flipped, !flipped && confirming.contains(id))
        };

        if !flipped && !awaiting_other {
            debug!("Notification already read");
            return Ok(self.local_unread());
        }
        if flipped {
            self.publish_local();
        }

        let confirmed = self.client.mark_notification_read(id).await;
        if flipped {
            self.confirming.lock().remove(id);
        }

        if let Err(e) = confirmed {
            if flipped {
                warn!(error = %e, "Mark read not confirmed, reverting");
                self.revert(&[id.to_string()]);
            } else {
                warn!(error = %e, "Mark read not confirmed");
            }
            return Err(e.into());
        }

        if !flipped {
            // the other call may have reverted while this confirm was in flight
            if let Some(n) = self.list.write().iter_mut().find(|n| n.id == id) {
                n.is_read = true;
            }
        }
        // a poll that started after the optimistic publish may have read the
        // server before the confirm landed
        self.publish_local();
        Ok(self.local_unread())
    }

    /// Mark every notification read, optimistically; the count is 0 at once.
    #[instrument(skip(self))]
    pub async fn mark_all(&self) -> Result<usize, NotificationError> {
        let flipped: Vec<String> = {
            let mut list = self.list.write();
            list.iter_mut()
                .filter(|n| !n.is_read)
                .map(|n| {
                    n.is_read = true;
                    n.id.clone()
                })
                .collect()
        };
        self.publish_local();

        if let Err(e) = self.client.mark_all_notifications_read().await {
            warn!(error = %e, reverted = flipped.len(), "Mark all read not confirmed, reverting");
            self.revert(&flipped);
            return Err(e.into());
        }

        info!(marked = flipped.len(), "All notifications marked read");
        self.publish_local();
        Ok(self.local_unread())
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.list.read().clone()
    }

    /// Unread count derived from the locally held list.
    pub fn local_unread(&self) -> usize {
        unread_count(&self.list.read())
    }

    fn publish_local(&self) {
        self.counter.publish(self.local_unread());
    }

    /// Undo the optimistic flips of one failed call, leaving other marks alone.
    fn revert(&self, ids: &[String]) {
        {
            let mut list = self.list.write();
            for n in list.iter_mut().filter(|n| ids.contains(&n.id)) {
                n.is_read = false;
            }
        }
        self.publish_local();
    }
}
