use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{
    mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender},
    RwLock,
};
use uuid::Uuid;

pub mod message_types;

/// Opaque handle for one live WebSocket connection.
///
/// Handed out on register and required for deregistration, so a session
/// can only ever remove itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of every connection currently attached to the group channel.
///
/// There is a single shared broadcast scope: one message fans out to all
/// registered connections, the sender included. Raw senders never leave
/// this module; sessions interact through their `ConnectionId` and the
/// receiver returned at registration.
#[derive(Default, Clone)]
pub struct ConnectionRegistry {
    inner: Arc<RwLock<HashMap<ConnectionId, UnboundedSender<String>>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new connection. Returns the connection handle and the
    /// channel the session must drain into its socket.
    pub async fn register(&self) -> (ConnectionId, UnboundedReceiver<String>) {
        let (tx, rx) = unbounded_channel();
        let id = ConnectionId::new();

        let mut guard = self.inner.write().await;
        guard.insert(id, tx);
        tracing::debug!(connection = ?id, total = guard.len(), "connection registered");

        (id, rx)
    }

    /// Remove a connection. Must be called when the session closes,
    /// otherwise the dead sender lingers until the next broadcast sweep.
    pub async fn deregister(&self, id: ConnectionId) {
        let mut guard = self.inner.write().await;
        if guard.remove(&id).is_some() {
            tracing::debug!(connection = ?id, remaining = guard.len(), "connection removed");
        }
    }

    /// Fan a frame out to every registered connection in one pass,
    /// dropping senders whose receiving session is already gone.
    pub async fn broadcast(&self, frame: String) -> usize {
        let mut guard = self.inner.write().await;
        let before = guard.len();
        guard.retain(|_, tx| tx.send(frame.clone()).is_ok());
        let delivered = guard.len();

        if delivered != before {
            tracing::debug!(
                swept = before - delivered,
                active = delivered,
                "dead connections swept during broadcast"
            );
        }
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_connection_including_sender() {
        let registry = ConnectionRegistry::new();
        let (_id_a, mut rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;

        let delivered = registry.broadcast("hello".to_string()).await;
        assert_eq!(delivered, 2);
        assert_eq!(rx_a.recv().await.as_deref(), Some("hello"));
        assert_eq!(rx_b.recv().await.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn deregister_stops_delivery() {
        let registry = ConnectionRegistry::new();
        let (id_a, mut rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;

        registry.deregister(id_a).await;
        assert_eq!(registry.connection_count().await, 1);

        registry.broadcast("after".to_string()).await;
        assert_eq!(rx_b.recv().await.as_deref(), Some("after"));
        assert!(rx_a.try_recv().is_err());
    }

    #[tokio::test]
    async fn dropped_receivers_are_swept_on_broadcast() {
        let registry = ConnectionRegistry::new();
        let (_id_a, rx_a) = registry.register().await;
        let (_id_b, mut rx_b) = registry.register().await;
        drop(rx_a);

        let delivered = registry.broadcast("sweep".to_string()).await;
        assert_eq!(delivered, 1);
        assert_eq!(registry.connection_count().await, 1);
        assert_eq!(rx_b.recv().await.as_deref(), Some("sweep"));
    }

    #[tokio::test]
    async fn deregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (id, _rx) = registry.register().await;
        registry.deregister(id).await;
        registry.deregister(id).await;
        assert_eq!(registry.connection_count().await, 0);
    }
}
