use crate::connection::Channel;
use crate::message::{Event as SseEvent, Message as SseMessage, MessageScope};
use crate::Manager;
use async_trait::async_trait;
use events::{DomainEvent, EventHandler};
use log::*;
use std::sync::Arc;

/// Handles domain events by converting them to SSE messages and broadcasting
/// them to every live viewer of the matching channel.
pub struct SseDomainEventHandler {
    sse_manager: Arc<Manager>,
}

impl SseDomainEventHandler {
    pub fn new(sse_manager: Arc<Manager>) -> Self {
        Self { sse_manager }
    }
}

#[async_trait]
impl EventHandler for SseDomainEventHandler {
    async fn handle(&self, event: &DomainEvent) {
        let (sse_event, channel) = match event {
            DomainEvent::MessageUpserted { message } => {
                (SseEvent::ChatMessage(message.clone()), Channel::Messages)
            }
            DomainEvent::LogSubmitted { entry } => {
                (SseEvent::LogEntry(entry.clone()), Channel::Logs)
            }
        };

        let reached = self.sse_manager.send_message(SseMessage {
            event: sse_event,
            scope: MessageScope::Broadcast { channel },
        });

        debug!("Relayed domain event to {reached} {channel:?} client(s)");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_message_upserted_goes_to_message_channel() {
        let manager = Arc::new(Manager::new());
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let (log_tx, mut log_rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Messages, msg_tx);
        manager.register_connection(Channel::Logs, log_tx);

        let handler = SseDomainEventHandler::new(manager);
        handler
            .handle(&DomainEvent::MessageUpserted {
                message: json!({"message_id": "m1"}),
            })
            .await;

        assert!(msg_rx.try_recv().is_ok());
        assert!(log_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_log_submitted_goes_to_log_channel() {
        let manager = Arc::new(Manager::new());
        let (log_tx, mut log_rx) = mpsc::unbounded_channel();
        manager.register_connection(Channel::Logs, log_tx);

        let handler = SseDomainEventHandler::new(manager);
        handler
            .handle(&DomainEvent::LogSubmitted {
                entry: json!({"message": "disk full"}),
            })
            .await;

        assert!(log_rx.try_recv().is_ok());
    }
}
