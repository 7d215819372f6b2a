use axum::response::sse::Event;
use dashmap::DashMap;
use log::*;
use std::convert::Infallible;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

pub type EventSender = UnboundedSender<Result<Event, Infallible>>;

/// Unique identifier for a connection (server-generated, increasing from 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Independent fan-out groups. A broadcast on one channel never reaches the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Live chat messages and heartbeats
    Messages,
    /// Live log entries
    Logs,
}

#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    pub channel: Channel,
    pub sender: EventSender,
}

/// Connection registry keyed by connection id.
///
/// A connection whose receiving half has gone away is removed the first time
/// a send to it fails, so the map only ever grows with live clients.
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    connections: DashMap<ConnectionId, ConnectionInfo>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            connections: DashMap::new(),
        }
    }

    /// Register a new connection - O(1)
    pub fn register(&self, channel: Channel, sender: EventSender) -> ConnectionId {
        let connection_id = ConnectionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.connections
            .insert(connection_id, ConnectionInfo { channel, sender });

        connection_id
    }

    /// Unregister a connection - O(1). Returns false if it was already gone.
    pub fn unregister(&self, connection_id: &ConnectionId) -> bool {
        self.connections.remove(connection_id).is_some()
    }

    /// Send to a single connection. A failed send removes the connection.
    pub fn send_to(&self, connection_id: &ConnectionId, event: Event) -> bool {
        let delivered = match self.connections.get(connection_id) {
            Some(info) => info.sender.send(Ok(event)).is_ok(),
            None => return false,
        };

        if !delivered {
            warn!("Failed to send event to connection {connection_id}, removing it");
            self.connections.remove(connection_id);
        }

        delivered
    }

    /// Broadcast to every connection on `channel` - O(n).
    /// Connections that fail are removed. Returns how many received the event.
    pub fn broadcast(&self, channel: Channel, event: Event) -> usize {
        let mut delivered = 0;
        let mut failed = Vec::new();

        // Failed ids are collected first: removing while iterating would
        // deadlock on the shard lock held by the iterator.
        for entry in self.connections.iter() {
            if entry.value().channel != channel {
                continue;
            }
            match entry.value().sender.send(Ok(event.clone())) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        "Failed to send broadcast to connection {}: {}",
                        entry.key(),
                        e
                    );
                    failed.push(*entry.key());
                }
            }
        }

        for connection_id in &failed {
            self.connections.remove(connection_id);
        }

        debug!(
            "Broadcast on {:?} reached {} connection(s), dropped {}",
            channel,
            delivered,
            failed.len()
        );

        delivered
    }

    pub fn connection_count(&self, channel: Channel) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.value().channel == channel)
            .count()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn event(data: &str) -> Event {
        Event::default().data(data)
    }

    #[test]
    fn test_register_hands_out_increasing_ids() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();

        let first = registry.register(Channel::Messages, tx.clone());
        let second = registry.register(Channel::Messages, tx);

        assert_eq!(first.value(), 0);
        assert_eq!(second.value(), 1);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = ConnectionRegistry::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = registry.register(Channel::Logs, tx);

        assert!(registry.unregister(&id));
        assert!(!registry.unregister(&id));
        assert_eq!(registry.connection_count(Channel::Logs), 0);
    }

    #[test]
    fn test_broadcast_reaches_only_its_channel() {
        let registry = ConnectionRegistry::new();
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let (log_tx, mut log_rx) = mpsc::unbounded_channel();
        registry.register(Channel::Messages, msg_tx);
        registry.register(Channel::Logs, log_tx);

        let delivered = registry.broadcast(Channel::Messages, event("hello"));

        assert_eq!(delivered, 1);
        assert!(msg_rx.try_recv().is_ok());
        assert!(log_rx.try_recv().is_err());
    }

    #[test]
    fn test_broadcast_prunes_closed_connections() {
        let registry = ConnectionRegistry::new();
        let (live_tx, mut live_rx) = mpsc::unbounded_channel();
        let (dead_tx, dead_rx) = mpsc::unbounded_channel();
        registry.register(Channel::Messages, live_tx);
        registry.register(Channel::Messages, dead_tx);
        drop(dead_rx);

        let delivered = registry.broadcast(Channel::Messages, event("hello"));

        assert_eq!(delivered, 1);
        assert!(live_rx.try_recv().is_ok());
        assert_eq!(registry.connection_count(Channel::Messages), 1);
    }

    #[test]
    fn test_broadcast_with_no_connections_is_a_noop() {
        let registry = ConnectionRegistry::new();
        assert_eq!(registry.broadcast(Channel::Logs, event("nobody")), 0);
    }

    #[test]
    fn test_send_to_removes_connection_on_failure() {
        let registry = ConnectionRegistry::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let id = registry.register(Channel::Messages, tx);
        drop(rx);

        assert!(!registry.send_to(&id, event("gone")));
        assert_eq!(registry.connection_count(Channel::Messages), 0);
        assert!(!registry.send_to(&id, event("still gone")));
    }

    #[test]
    fn test_send_to_delivers_to_single_connection() {
        let registry = ConnectionRegistry::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        let a = registry.register(Channel::Messages, tx_a);
        registry.register(Channel::Messages, tx_b);

        assert!(registry.send_to(&a, event("just a")));
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }
}
