//! Event system infrastructure for the admin panel.
//!
//! This crate provides the event system that enables loose coupling between
//! domain logic and infrastructure concerns (like SSE notifications).
//!
//! # Architecture
//!
//! - **DomainEvent**: Enum representing all business events in the system
//! - **EventHandler**: Trait for implementing event handlers
//! - **EventPublisher**: Publishes events to registered handlers
//!
//! This crate has no dependencies on internal crates (entity, domain, etc.),
//! avoiding circular dependencies. Document data is carried as serialized JSON values.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Domain events that represent business-level changes in the system.
/// These events are emitted when domain operations complete successfully.
///
/// Every live viewer sees every event; there is no per-user routing.
#[derive(Debug, Clone)]
pub enum DomainEvent {
    /// Emitted after a chat message was inserted or replaced.
    MessageUpserted {
        /// The stored message as the dashboard renders it.
        message: Value,
    },
    /// Emitted after a log entry was persisted.
    LogSubmitted { entry: Value },
}

/// Trait for handling domain events.
/// Implementations can perform side effects like sending notifications,
/// updating caches, logging, etc.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: &DomainEvent);
}

/// Publishes domain events to registered handlers.
/// Handlers are called sequentially in registration order.
#[derive(Clone)]
pub struct EventPublisher {
    handlers: Arc<Vec<Arc<dyn EventHandler>>>,
}

impl EventPublisher {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Vec::new()),
        }
    }

    /// Register a new event handler.
    /// Note: This creates a new publisher instance with the additional handler.
    /// Store the returned publisher in your application state.
    pub fn with_handler(mut self, handler: Arc<dyn EventHandler>) -> Self {
        let mut handlers = (*self.handlers).clone();
        handlers.push(handler);
        self.handlers = Arc::new(handlers);
        self
    }

    /// Publish an event to all registered handlers.
    pub async fn publish(&self, event: DomainEvent) {
        for handler in self.handlers.iter() {
            handler.handle(&event).await;
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recorder {
        name: &'static str,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            let kind = match event {
                DomainEvent::MessageUpserted { .. } => "message",
                DomainEvent::LogSubmitted { .. } => "log",
            };
            self.seen.lock().unwrap().push(format!("{}:{}", self.name, kind));
        }
    }

    #[tokio::test]
    async fn test_publish_calls_handlers_in_registration_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let publisher = EventPublisher::new()
            .with_handler(Arc::new(Recorder {
                name: "first",
                seen: seen.clone(),
            }))
            .with_handler(Arc::new(Recorder {
                name: "second",
                seen: seen.clone(),
            }));

        publisher
            .publish(DomainEvent::LogSubmitted {
                entry: json!({"message": "hello"}),
            })
            .await;

        assert_eq!(*seen.lock().unwrap(), vec!["first:log", "second:log"]);
    }

    #[tokio::test]
    async fn test_with_handler_leaves_original_publisher_untouched() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let bare = EventPublisher::default();
        let wired = bare.clone().with_handler(Arc::new(Recorder {
            name: "only",
            seen: seen.clone(),
        }));

        bare.publish(DomainEvent::MessageUpserted { message: json!({}) })
            .await;
        assert!(seen.lock().unwrap().is_empty());

        wired
            .publish(DomainEvent::MessageUpserted { message: json!({}) })
            .await;
        assert_eq!(*seen.lock().unwrap(), vec!["only:message"]);
    }
}
