use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, broadcast, mpsc};
use uuid::Uuid;

use postsy_types::events::GatewayEvent;

/// Manages all connected clients and broadcasts events.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// Broadcast channel for gateway events — all connected clients receive all events
    broadcast_tx: broadcast::Sender<GatewayEvent>,

    /// Track online users: user_id -> handle
    online_users: RwLock<HashMap<Uuid, String>>,

    /// Per-user targeted send channels: user_id -> (conn_id, sender)
    user_channels: RwLock<HashMap<Uuid, (Uuid, mpsc::UnboundedSender<GatewayEvent>)>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                online_users: RwLock::new(HashMap::new()),
                user_channels: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// Subscribe to gateway events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event to all connected clients.
    pub fn broadcast(&self, event: GatewayEvent) {
        let _ = self.inner.broadcast_tx.send(event);
    }

    /// Register a per-user targeted channel. Returns (conn_id, receiver).
    pub async fn register_user_channel(
        &self,
        user_id: Uuid,
    ) -> (Uuid, mpsc::UnboundedReceiver<GatewayEvent>) {
        let conn_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .user_channels
            .write()
            .await
            .insert(user_id, (conn_id, tx));
        (conn_id, rx)
    }

    /// Unregister a per-user targeted channel, but only if conn_id matches.
    pub async fn unregister_user_channel(&self, user_id: Uuid, conn_id: Uuid) {
        let mut channels = self.inner.user_channels.write().await;
        if let Some((stored_conn_id, _)) = channels.get(&user_id) {
            if *stored_conn_id == conn_id {
                channels.remove(&user_id);
            }
        }
    }

    /// Send a targeted event to a specific user. Dropped silently if the
    /// user has no open gateway connection.
    pub async fn send_to_user(&self, user_id: Uuid, event: GatewayEvent) {
        let channels = self.inner.user_channels.read().await;
        if let Some((_, tx)) = channels.get(&user_id) {
            let _ = tx.send(event);
        }
    }

    /// Register a user as online.
    pub async fn user_online(&self, user_id: Uuid, handle: String) {
        self.inner
            .online_users
            .write()
            .await
            .insert(user_id, handle.clone());

        self.broadcast(GatewayEvent::PresenceUpdate {
            user_id,
            handle,
            online: true,
        });
    }

    /// Register a user as offline. Only cleans up if conn_id matches.
    pub async fn user_offline(&self, user_id: Uuid, conn_id: Uuid) {
        // Only clean up if this connection still owns the user channel
        let is_current = {
            let channels = self.inner.user_channels.read().await;
            channels.get(&user_id).map_or(false, |(cid, _)| *cid == conn_id)
        };

        if !is_current {
            // A newer connection has taken over — don't touch anything
            return;
        }

        let handle = self
            .inner
            .online_users
            .write()
            .await
            .remove(&user_id)
            .unwrap_or_default();

        self.unregister_user_channel(user_id, conn_id).await;

        self.broadcast(GatewayEvent::PresenceUpdate {
            user_id,
            handle,
            online: false,
        });
    }

    /// Get list of online users.
    pub async fn online_users(&self) -> Vec<(Uuid, String)> {
        self.inner
            .online_users
            .read()
            .await
            .iter()
            .map(|(id, handle)| (*id, handle.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn targeted_events_only_reach_their_user() {
        let dispatcher = Dispatcher::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let (_, mut alice_rx) = dispatcher.register_user_channel(alice).await;
        let (_, mut bob_rx) = dispatcher.register_user_channel(bob).await;

        dispatcher
            .send_to_user(
                alice,
                GatewayEvent::ConversationExpired {
                    conversation_id: Uuid::new_v4(),
                },
            )
            .await;

        assert!(alice_rx.try_recv().is_ok());
        assert!(bob_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_connection_does_not_clobber_newer_one() {
        let dispatcher = Dispatcher::new();
        let user = Uuid::new_v4();

        let (old_conn, _old_rx) = dispatcher.register_user_channel(user).await;
        dispatcher.user_online(user, "AB123C".into()).await;

        // A reconnect replaces the channel
        let (_new_conn, mut new_rx) = dispatcher.register_user_channel(user).await;

        // The old connection tearing down must not kick the new one offline
        dispatcher.user_offline(user, old_conn).await;
        assert_eq!(dispatcher.online_users().await.len(), 1);

        dispatcher
            .send_to_user(
                user,
                GatewayEvent::ConversationExpired {
                    conversation_id: Uuid::new_v4(),
                },
            )
            .await;
        assert!(new_rx.try_recv().is_ok());
    }
}
