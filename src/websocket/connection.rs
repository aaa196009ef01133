//! WebSocket connection manager
//!
//! Registry of open relay sockets using DashMap for concurrent access.

use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

/// WebSocket sender channel type
pub type WsSender = mpsc::UnboundedSender<Message>;

/// Unique connection identifier
pub type ConnectionId = u64;

/// Thread-safe registry mapping connection id to its outbound channel
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, WsSender>,
    next_conn_id: AtomicU64,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            next_conn_id: AtomicU64::new(1),
        }
    }

    /// Register a connection and return its id
    pub fn add_connection(&self, tx: WsSender) -> ConnectionId {
        let conn_id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.connections.insert(conn_id, tx);

        tracing::info!(
            conn_id,
            total_connections = self.connection_count(),
            "WebSocket connection added"
        );
        conn_id
    }

    pub fn remove_connection(&self, conn_id: ConnectionId) {
        if self.connections.remove(&conn_id).is_some() {
            tracing::info!(
                conn_id,
                remaining_connections = self.connection_count(),
                "WebSocket connection removed"
            );
        }
    }

    /// Forward `message` to every open connection except `from`.
    ///
    /// Returns the number of peers the message was queued for. Peers whose
    /// channel is closed are pruned.
    pub fn broadcast_from(&self, from: ConnectionId, message: &Message) -> usize {
        let mut delivered = 0;
        let mut dead = Vec::new();

        for entry in self.connections.iter() {
            if *entry.key() == from {
                continue;
            }
            if entry.value().send(message.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        for conn_id in dead {
            tracing::warn!(conn_id, "Dropping disconnected WebSocket peer");
            self.connections.remove(&conn_id);
        }

        tracing::debug!(from, recipients = delivered, "Message relayed");
        delivered
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
