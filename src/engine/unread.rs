use std::sync::Arc;

use tokio::sync::watch;

/// Latest unread count plus the revision of the publish that set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UnreadState {
    pub count: usize,
    pub revision: u64,
}

/// The one observable unread count that the badge poller and the
/// notification list both publish into and subscribe to.
///
/// Local publishes always win. A polled value is applied only if nothing
/// was published since the poll started, so a slow poll can't overwrite a
/// fresher count.
#[derive(Clone)]
pub struct UnreadCounter {
    tx: Arc<watch::Sender<UnreadState>>,
}

/// Revision observed when a poll started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket(u64);

impl Default for UnreadCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl UnreadCounter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(UnreadState::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn get(&self) -> usize {
        self.tx.borrow().count
    }

    pub fn subscribe(&self) -> watch::Receiver<UnreadState> {
        self.tx.subscribe()
    }

    /// Publish a count derived from a confirmed or optimistic local list.
    pub fn publish(&self, count: usize) {
        self.tx.send_modify(|state| {
            state.count = count;
            state.revision += 1;
        });
    }

    pub fn ticket(&self) -> PollTicket {
        PollTicket(self.tx.borrow().revision)
    }

    /// Publish a polled count unless a newer publish happened after `ticket`.
    /// Returns whether the value was applied.
    pub fn publish_polled(&self, ticket: PollTicket, count: usize) -> bool {
        let mut applied = false;
        self.tx.send_if_modified(|state| {
            if state.revision != ticket.0 {
                return false;
            }
            applied = true;
            let changed = state.count != count;
            state.count = count;
            state.revision += 1;
            changed
        });
        applied
    }
}
