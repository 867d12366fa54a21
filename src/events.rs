//! Session lifecycle events on a scoped broadcast channel.
//!
//! The session-owning layer subscribes and tears down UI state on
//! [`AuthEvent::Expired`].

use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoggedIn,
    LoggedOut,
    /// Credentials were rejected and could not be refreshed.
    Expired,
}

#[derive(Debug, Clone)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Broadcast `event`. Having no subscribers is not an error.
    pub fn emit(&self, event: AuthEvent) {
        if self.tx.send(event).is_err() {
            log::debug!("No subscribers for auth event {:?}", event);
        }
    }
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let events = AuthEvents::new();
        let mut rx = events.subscribe();
        events.emit(AuthEvent::Expired);
        assert_eq!(rx.recv().await.unwrap(), AuthEvent::Expired);
    }

    #[test]
    fn test_emit_without_subscribers() {
        AuthEvents::new().emit(AuthEvent::LoggedOut);
    }
}
