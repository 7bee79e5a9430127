use std::collections::{HashMap, HashSet};

use agency_core::channels::Channel;
use agency_core::types::{DbId, Timestamp};
use axum::body::Bytes;
use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};

/// Channel sender half for pushing messages to a WebSocket connection.
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Metadata for a single WebSocket connection.
pub struct WsConnection {
    /// Authenticated user that opened the connection.
    pub user_id: DbId,
    /// Channel sender for outbound messages to this connection.
    pub sender: WsSender,
    /// Projects whose `project:{id}` channel this connection joined.
    pub projects: HashSet<DbId>,
    /// When this connection was established.
    pub connected_at: Timestamp,
}

#[derive(Default)]
struct Registry {
    connections: HashMap<String, WsConnection>,
    /// user id -> ids of that user's open connections.
    presence: HashMap<DbId, HashSet<String>>,
}

/// Manages all active WebSocket connections and user presence.
///
/// Thread-safe via interior `RwLock`; wrapped in `Arc` and shared between
/// connection tasks, the realtime router and the heartbeat.
pub struct WsManager {
    registry: RwLock<Registry>,
}

impl WsManager {
    /// Create a new, empty connection manager.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(Registry::default()),
        }
    }

    /// Register a new connection for `user_id`.
    ///
    /// Returns the receiver half of the message channel so the caller can
    /// forward messages to the WebSocket sink. The connection is implicitly
    /// on its owner's `user:{id}` channel.
    pub async fn add(&self, conn_id: String, user_id: DbId) -> mpsc::UnboundedReceiver<Message> {
        let (tx, rx) = mpsc::unbounded_channel();
        let conn = WsConnection {
            user_id,
            sender: tx,
            projects: HashSet::new(),
            connected_at: chrono::Utc::now(),
        };
        let mut registry = self.registry.write().await;
        registry
            .presence
            .entry(user_id)
            .or_default()
            .insert(conn_id.clone());
        registry.connections.insert(conn_id, conn);
        rx
    }

    /// Remove a connection by its ID. The user goes offline with their
    /// last connection.
    pub async fn remove(&self, conn_id: &str) {
        let mut registry = self.registry.write().await;
        let Some(conn) = registry.connections.remove(conn_id) else {
            return;
        };
        if let Some(ids) = registry.presence.get_mut(&conn.user_id) {
            ids.remove(conn_id);
            if ids.is_empty() {
                registry.presence.remove(&conn.user_id);
            }
        }
    }

    /// Join `project:{project_id}`. Returns `false` for an unknown connection.
    pub async fn subscribe(&self, conn_id: &str, project_id: DbId) -> bool {
        match self.registry.write().await.connections.get_mut(conn_id) {
            Some(conn) => {
                conn.projects.insert(project_id);
                true
            }
            None => false,
        }
    }

    /// Leave `project:{project_id}`. Returns whether the connection had joined it.
    pub async fn unsubscribe(&self, conn_id: &str, project_id: DbId) -> bool {
        self.registry
            .write()
            .await
            .connections
            .get_mut(conn_id)
            .is_some_and(|conn| conn.projects.remove(&project_id))
    }

    /// Whether the user has at least one open connection.
    pub async fn is_online(&self, user_id: DbId) -> bool {
        self.registry.read().await.presence.contains_key(&user_id)
    }

    /// Connection IDs belonging to a given user.
    pub async fn get_by_user(&self, user_id: DbId) -> Vec<String> {
        self.registry
            .read()
            .await
            .presence
            .get(&user_id)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Send a message to one connection. Returns `false` if it is gone.
    pub async fn send_to_connection(&self, conn_id: &str, message: Message) -> bool {
        self.registry
            .read()
            .await
            .connections
            .get(conn_id)
            .is_some_and(|conn| conn.sender.send(message).is_ok())
    }

    /// Send a message to every connection of a user.
    ///
    /// Returns the number of connections the message was queued for.
    /// Closed senders are skipped; the connection task removes them.
    pub async fn send_to_user(&self, user_id: DbId, message: Message) -> usize {
        let registry = self.registry.read().await;
        let Some(ids) = registry.presence.get(&user_id) else {
            return 0;
        };
        let mut count = 0;
        for conn in ids.iter().filter_map(|id| registry.connections.get(id)) {
            if conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Send a message to every connection subscribed to a project.
    pub async fn send_to_project(&self, project_id: DbId, message: Message) -> usize {
        let registry = self.registry.read().await;
        let mut count = 0;
        for conn in registry.connections.values() {
            if conn.projects.contains(&project_id) && conn.sender.send(message.clone()).is_ok() {
                count += 1;
            }
        }
        count
    }

    /// Route a message to the connections behind a realtime channel.
    pub async fn send_to_channel(&self, channel: Channel, message: Message) -> usize {
        match channel {
            Channel::User(id) => self.send_to_user(id, message).await,
            Channel::Project(id) => self.send_to_project(id, message).await,
        }
    }

    /// Return the current number of active connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.read().await.connections.len()
    }

    /// Send a Close frame to every connection, then clear the registry.
    ///
    /// Used during graceful shutdown.
    pub async fn shutdown_all(&self) {
        let mut registry = self.registry.write().await;
        let count = registry.connections.len();
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Close(None));
        }
        registry.connections.clear();
        registry.presence.clear();
        tracing::info!(count, "Closed all WebSocket connections");
    }

    /// Send a Ping frame to every connected client.
    pub async fn ping_all(&self) {
        let registry = self.registry.read().await;
        for conn in registry.connections.values() {
            let _ = conn.sender.send(Message::Ping(Bytes::new()));
        }
    }
}

impl Default for WsManager {
    fn default() -> Self {
        Self::new()
    }
}
