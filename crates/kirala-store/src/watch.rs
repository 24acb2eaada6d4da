//! Change notification for real-time views.
//!
//! Every mutating helper on [`Database`](crate::Database) publishes a
//! [`StoreEvent`] naming the collection it touched.  Views subscribe, and on
//! each event re-query the snapshot they project.  Dropping the receiver is
//! the unsubscribe; there is no registry to clean up.

use tokio::sync::broadcast;

/// Collections a [`StoreEvent`] can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Users,
    Toys,
    Rentals,
    Rooms,
    Messages,
    Friends,
}

/// A single change notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub collection: Collection,
    /// Document key of the touched record, when a single one can be named.
    pub key: Option<String>,
}

/// Broadcast fan-out for store events.
#[derive(Debug)]
pub(crate) struct ChangeHub {
    tx: broadcast::Sender<StoreEvent>,
}

impl ChangeHub {
    pub(crate) fn new() -> Self {
        // Slow subscribers observe a lag error and re-query; 64 events of
        // buffer is plenty for a single-user client.
        let (tx, _) = broadcast::channel(64);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn publish(&self, collection: Collection, key: Option<String>) {
        // No receivers is the normal case for batch/test use.
        let _ = self.tx.send(StoreEvent { collection, key });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_receiver_is_unsubscribed() {
        let hub = ChangeHub::new();
        let rx = hub.subscribe();
        drop(rx);
        // Publishing with no live receivers must not error or panic.
        hub.publish(Collection::Toys, None);
    }

    #[tokio::test]
    async fn events_reach_live_subscribers() {
        let hub = ChangeHub::new();
        let mut rx = hub.subscribe();
        hub.publish(Collection::Messages, Some("room_a".into()));

        let event = rx.recv().await.unwrap();
        assert_eq!(event.collection, Collection::Messages);
        assert_eq!(event.key.as_deref(), Some("room_a"));
    }
}
