//! Snapshot broadcasting to store subscribers.
//!
//! Every logical change to the visible record set is published as one full
//! [`TaskSnapshot`]. Transports adapt the receiver to their own protocol.

use tokio::sync::broadcast;

use crate::types::TaskSnapshot;

/// Fan-out channel for index snapshots, owned by one store instance.
///
/// Subscribers hold a `broadcast::Receiver`; dropping it revokes the
/// subscription. A subscriber that falls behind lags and skips snapshots
/// rather than blocking the store's mutation path.
#[derive(Debug, Clone)]
pub struct ChangeBroadcaster {
    sender: broadcast::Sender<TaskSnapshot>,
}

impl ChangeBroadcaster {
    /// Create a broadcaster with the given per-subscriber backlog capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a snapshot to all current subscribers.
    pub fn send(&self, snapshot: TaskSnapshot) {
        match self.sender.send(snapshot) {
            Ok(count) => {
                crate::debug_event!("broadcast", "sent", "snapshot to {count} subscribers");
            }
            Err(_) => {
                // No receivers, this is fine.
                crate::debug_event!("broadcast", "dropped", "no subscribers");
            }
        }
    }

    /// Register a new subscriber.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskSnapshot> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    #[test]
    fn test_subscribers_are_independent() {
        let broadcaster = ChangeBroadcaster::new(16);
        let mut a = broadcaster.subscribe();
        let b = broadcaster.subscribe();

        drop(b); // Revoking one must not affect the other.
        broadcaster.send(Arc::new(Vec::new()));

        assert!(a.try_recv().is_ok());
    }

    #[test]
    fn test_send_without_subscribers_is_harmless() {
        let broadcaster = ChangeBroadcaster::new(16);
        broadcaster.send(Arc::new(Vec::new()));
    }
}
