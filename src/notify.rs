//! Change notifications for committed writes.
//!
//! - tokio::sync::broadcast for pub-sub notifications
//! - Events are published by the writer thread only after a commit

use tokio::sync::broadcast::{self, Receiver, Sender};

use crate::model::ClipId;

/// A committed change to the clip store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipEvent {
    /// A clip was inserted with the given id.
    Added { id: ClipId },
    /// An existing clip was removed.
    Deleted { id: ClipId },
    /// Every clip was removed.
    Cleared,
}

/// Notification bus for views that mirror the store.
///
/// Subscribers that fall behind lose the oldest events; they should treat
/// a lag error as "reload everything".
#[derive(Clone)]
pub struct ChangeBus {
    sender: Sender<ClipEvent>,
}

impl ChangeBus {
    /// Create a new change bus with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Subscribe to all future events.
    pub fn subscribe(&self) -> Receiver<ClipEvent> {
        self.sender.subscribe()
    }

    /// Publish an event, returning the number of receivers reached.
    pub fn publish(&self, event: ClipEvent) -> usize {
        // send() errors when nobody is listening, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Get the number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new(256)
    }
}
