//! In-process fan-out of session changes.
//!
//! Login, logout, token refresh and admin removal publish here; every open
//! `/events` stream for the affected identity reacts without a page reload.

use fresh_shine_core::SessionEvent;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Broadcast hub for [`SessionEvent`]s.
#[derive(Debug, Clone)]
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish an event. Returns how many listeners received it.
    pub fn publish(&self, event: SessionEvent) -> usize {
        tracing::debug!(?event, "Session event");
        // No listeners is not an error.
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}
