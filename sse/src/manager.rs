use crate::connection::{Channel, ConnectionId, ConnectionRegistry, EventSender};
use crate::message::{Event as SseEvent, EventType, Message as SseMessage, MessageScope};
use axum::response::sse::Event;
use chrono::Utc;
use log::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

pub struct Manager {
    registry: Arc<ConnectionRegistry>,
}

impl Manager {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
        }
    }

    /// Register a new connection and return its unique ID
    pub fn register_connection(&self, channel: Channel, sender: EventSender) -> ConnectionId {
        let connection_id = self.registry.register(channel, sender);
        info!(
            "Registered SSE connection {connection_id} on {channel:?}. Total: {}",
            self.registry.connection_count(channel)
        );
        connection_id
    }

    /// Unregister a connection by ID
    pub fn unregister_connection(&self, connection_id: &ConnectionId) {
        if self.registry.unregister(connection_id) {
            info!("Unregistered SSE connection {connection_id}");
        }
    }

    /// Send a message based on its scope. Returns the number of connections reached.
    pub fn send_message(&self, message: SseMessage) -> usize {
        let event_type = message.event.event_type();

        let event_data = match serde_json::to_string(&message.event.payload()) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize SSE event {event_type}: {e}");
                return 0;
            }
        };

        let event = Event::default().data(event_data);

        match message.scope {
            MessageScope::Connection { connection_id } => {
                usize::from(self.registry.send_to(&connection_id, event))
            }
            MessageScope::Broadcast { channel } => {
                debug!("Broadcasting {event_type} on {channel:?}");
                self.registry.broadcast(channel, event)
            }
        }
    }

    pub fn connection_count(&self, channel: Channel) -> usize {
        self.registry.connection_count(channel)
    }

    /// Broadcast a heartbeat on the message channel every `interval` until the
    /// returned task is aborted.
    pub fn spawn_heartbeat(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let manager = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick completes immediately; clients already got a
            // connection frame, so skip it.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                trace!(
                    "Sending heartbeat to {} client(s)",
                    manager.connection_count(Channel::Messages)
                );
                manager.send_message(SseMessage {
                    event: SseEvent::Heartbeat {
                        timestamp: Utc::now(),
                    },
                    scope: MessageScope::Broadcast {
                        channel: Channel::Messages,
                    },
                });
            }
        })
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn test_send_message_to_single_connection() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let id = manager.register_connection(Channel::Messages, tx);

        let reached = manager.send_message(SseMessage {
            event: SseEvent::LogStreamConnected,
            scope: MessageScope::Connection { connection_id: id },
        });

        assert_eq!(reached, 1);
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn test_broadcast_skips_other_channel() {
        let manager = Manager::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Logs, tx);

        let reached = manager.send_message(SseMessage {
            event: SseEvent::ChatMessage(json!({"message_id": "m1"})),
            scope: MessageScope::Broadcast {
                channel: Channel::Messages,
            },
        });

        assert_eq!(reached, 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_unregister_connection_drops_count() {
        let manager = Manager::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let id = manager.register_connection(Channel::Messages, tx);

        manager.unregister_connection(&id);

        assert_eq!(manager.connection_count(Channel::Messages), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_reaches_message_connections() {
        let manager = Arc::new(Manager::new());
        let (tx, mut rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Messages, tx);

        let heartbeat = manager.spawn_heartbeat(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(rx.recv().await.is_some());
        heartbeat.abort();
    }
}
