use crate::connection::{Channel, ConnectionId};
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

/// Trait for getting the SSE event type name (used for logging; frames are unnamed)
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

#[derive(Debug, Clone)]
pub enum Event {
    /// First frame on a new message stream
    ConnectionEstablished {
        client_id: u64,
        timestamp: DateTime<Utc>,
    },
    /// Periodic liveness frame on the message channel
    Heartbeat { timestamp: DateTime<Utc> },
    /// First frame on a new log stream
    LogStreamConnected,
    /// A stored chat message, forwarded verbatim
    ChatMessage(Value),
    /// A stored log entry, forwarded verbatim
    LogEntry(Value),
}

impl Event {
    /// JSON carried in the frame's `data:` field.
    pub fn payload(&self) -> Value {
        match self {
            Event::ConnectionEstablished {
                client_id,
                timestamp,
            } => json!({
                "type": "connection_established",
                "clientId": client_id,
                "timestamp": iso_timestamp(timestamp),
            }),
            Event::Heartbeat { timestamp } => json!({
                "type": "heartbeat",
                "timestamp": iso_timestamp(timestamp),
            }),
            Event::LogStreamConnected => json!({ "connected": true }),
            Event::ChatMessage(message) => message.clone(),
            Event::LogEntry(entry) => entry.clone(),
        }
    }
}

impl EventType for Event {
    fn event_type(&self) -> &'static str {
        match self {
            Event::ConnectionEstablished { .. } => "connection_established",
            Event::Heartbeat { .. } => "heartbeat",
            Event::LogStreamConnected => "log_stream_connected",
            Event::ChatMessage(_) => "chat_message",
            Event::LogEntry(_) => "log_entry",
        }
    }
}

/// Millisecond precision, `Z` suffix: what browsers produce for `Date#toISOString`.
pub fn iso_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone)]
pub struct Message {
    pub event: Event,
    pub scope: MessageScope,
}

#[derive(Debug, Clone)]
pub enum MessageScope {
    /// Send to one connection only
    Connection { connection_id: ConnectionId },
    /// Send to every connection on the channel
    Broadcast { channel: Channel },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_connection_established_payload_shape() {
        let timestamp = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let payload = Event::ConnectionEstablished {
            client_id: 7,
            timestamp,
        }
        .payload();

        assert_eq!(
            payload,
            json!({
                "type": "connection_established",
                "clientId": 7,
                "timestamp": "2025-03-01T12:00:00.000Z",
            })
        );
    }

    #[test]
    fn test_chat_message_payload_is_verbatim() {
        let message = json!({"message_id": "m1", "text": "hi"});
        assert_eq!(Event::ChatMessage(message.clone()).payload(), message);
    }

    #[test]
    fn test_log_stream_connected_payload() {
        assert_eq!(
            Event::LogStreamConnected.payload(),
            json!({ "connected": true })
        );
    }
}
