//! Chat message ingestion: validate, upsert by `message_id`, notify live viewers.
use crate::error::Error;
use async_trait::async_trait;
use crate::events::{DomainEvent, EventPublisher};
use chrono::{DateTime, Utc};
use entity::messages::{self, Model, OTHER_DIRECT_CHAT_ID, WHATSAPP_DIRECT_CHAT_ID};
use entity::Timestamp;
use entity_api::message as message_api;
use log::*;
use mongodb::Database;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use entity_api::message::Operation;

/// Source name the WhatsApp bridge reports.
pub const WHATSAPP_SOURCE: &str = "whatsapp";

/// Incoming message record as posted by a messenger bridge.
/// Fields are optional here so that a missing field is reported as a
/// validation failure instead of a deserialization failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewMessage {
    pub message_id: Option<String>,
    pub source_name: Option<String>,
    pub chat_id: Option<String>,
    pub text: Option<String>,
    pub sender_id: Option<String>,
    pub sender_name: Option<String>,
    pub image: Option<String>,
    pub data: Option<Value>,
    pub is_private: Option<bool>,
}

/// A stored message as the dashboard renders it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Message {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message_id: String,
    pub source_name: String,
    pub chat_id: String,
    pub text: String,
    pub sender_id: Option<String>,
    pub sender_name: String,
    pub image: Option<String>,
    pub data: Option<Value>,
    pub timestamp: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub is_private: Option<bool>,
}

impl From<messages::Model> for Message {
    fn from(model: messages::Model) -> Self {
        Self {
            id: model.id.map(|id| id.to_hex()),
            message_id: model.message_id,
            source_name: model.source_name,
            chat_id: model.chat_id,
            text: model.text,
            sender_id: model.sender_id,
            sender_name: model.sender_name,
            image: model.image,
            data: model.data.map(|data| data.into_relaxed_extjson()),
            timestamp: model.timestamp.to_chrono(),
            updated_at: model.updated_at.to_chrono(),
            is_private: model.is_private,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IngestOutcome {
    pub message_id: String,
    pub operation: Operation,
}

fn required(field: Option<String>) -> Result<String, Error> {
    field
        .filter(|value| !value.is_empty())
        .ok_or_else(|| Error::invalid("Required fields missing"))
}

/// Private conversations are folded into one pseudo-chat per source family.
pub fn resolve_chat_id(source_name: &str, chat_id: String, is_private: bool) -> String {
    if !is_private {
        chat_id
    } else if source_name == WHATSAPP_SOURCE {
        WHATSAPP_DIRECT_CHAT_ID.to_string()
    } else {
        OTHER_DIRECT_CHAT_ID.to_string()
    }
}

/// Builds the document to store. `first_seen` is the timestamp of an already
/// stored message with the same id, which a re-ingest must keep.
pub fn build_model(
    params: NewMessage,
    first_seen: Option<Timestamp>,
    now: Timestamp,
) -> Result<Model, Error> {
    let message_id = required(params.message_id)?;
    let source_name = required(params.source_name)?;
    let chat_id = required(params.chat_id)?;
    let text = required(params.text)?;
    let sender_name = required(params.sender_name)?;

    let data = params
        .data
        .map(|data| mongodb::bson::to_bson(&data))
        .transpose()?;

    let chat_id = resolve_chat_id(&source_name, chat_id, params.is_private.unwrap_or(false));

    Ok(Model {
        id: None,
        message_id,
        source_name,
        chat_id,
        text,
        sender_id: params.sender_id,
        sender_name,
        image: params.image,
        data,
        timestamp: first_seen.unwrap_or(now),
        updated_at: now,
        is_private: params.is_private,
    })
}

/// Where ingested messages are kept, keyed by `message_id`.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn find_by_message_id(&self, message_id: &str) -> Result<Option<Model>, Error>;

    /// Replaces or inserts; fills in `message.id` for a new document.
    async fn upsert(&self, message: &mut Model) -> Result<Operation, Error>;
}

#[async_trait]
impl MessageStore for Database {
    async fn find_by_message_id(&self, message_id: &str) -> Result<Option<Model>, Error> {
        Ok(message_api::find_by_message_id(self, message_id).await?)
    }

    async fn upsert(&self, message: &mut Model) -> Result<Operation, Error> {
        Ok(message_api::upsert(self, message).await?)
    }
}

/// Inserts the message, or replaces the one with the same `message_id`, and
/// publishes it to live viewers.
pub async fn ingest<S: MessageStore + ?Sized>(
    store: &S,
    event_publisher: &EventPublisher,
    params: NewMessage,
) -> Result<IngestOutcome, Error> {
    // Validate before touching the database
    let mut model = build_model(params, None, Timestamp::now())?;
    let message_id = model.message_id.clone();

    if let Some(existing) = store.find_by_message_id(&message_id).await? {
        model.id = existing.id;
        model.timestamp = existing.timestamp;
    }

    let operation = store.upsert(&mut model).await?;
    info!(
        "Message {} from {} {}",
        model.message_id,
        model.source_name,
        operation.as_str()
    );

    match serde_json::to_value(Message::from(model)) {
        Ok(message) => {
            event_publisher
                .publish(DomainEvent::MessageUpserted { message })
                .await
        }
        Err(e) => warn!("Failed to serialize message {message_id} for live viewers: {e}"),
    }

    Ok(IngestOutcome {
        message_id,
        operation,
    })
}

/// All messages of a chat, oldest first.
pub async fn find_by_chat_id(db: &Database, chat_id: &str) -> Result<Vec<Message>, Error> {
    let messages = message_api::find_by_chat_id(db, chat_id).await?;
    Ok(messages.into_iter().map(Message::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, EntityErrorKind, InternalErrorKind};
    use crate::events::EventHandler;
    use entity::Id;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Keeps messages in memory the way the collection does: replace by
    /// `message_id`, assign an `_id` on insert.
    #[derive(Default)]
    struct MemoryStore {
        messages: Mutex<HashMap<String, Model>>,
    }

    #[async_trait]
    impl MessageStore for MemoryStore {
        async fn find_by_message_id(&self, message_id: &str) -> Result<Option<Model>, Error> {
            Ok(self.messages.lock().unwrap().get(message_id).cloned())
        }

        async fn upsert(&self, message: &mut Model) -> Result<Operation, Error> {
            let mut messages = self.messages.lock().unwrap();
            let operation = if messages.contains_key(&message.message_id) {
                Operation::Updated
            } else {
                message.id = Some(Id::new());
                Operation::Created
            };
            messages.insert(message.message_id.clone(), message.clone());
            Ok(operation)
        }
    }

    #[derive(Default)]
    struct Recorder {
        messages: Mutex<Vec<Value>>,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: &DomainEvent) {
            if let DomainEvent::MessageUpserted { message } = event {
                self.messages.lock().unwrap().push(message.clone());
            }
        }
    }

    fn recording_publisher() -> (EventPublisher, Arc<Recorder>) {
        let recorder = Arc::new(Recorder::default());
        let publisher = EventPublisher::new().with_handler(recorder.clone());
        (publisher, recorder)
    }

    fn complete() -> NewMessage {
        NewMessage {
            message_id: Some("3EB0C767D26A".to_string()),
            source_name: Some("telegram".to_string()),
            chat_id: Some("-100200300".to_string()),
            text: Some("Wheat sown on field 4".to_string()),
            sender_id: Some("42".to_string()),
            sender_name: Some("Ivan".to_string()),
            ..Default::default()
        }
    }

    fn assert_missing_fields(err: Error) {
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid(
                "Required fields missing".to_string()
            )))
        );
    }

    #[test]
    fn test_build_model_rejects_missing_required_field() {
        let params = NewMessage {
            sender_name: None,
            ..complete()
        };
        assert_missing_fields(build_model(params, None, Timestamp::now()).unwrap_err());
    }

    #[test]
    fn test_build_model_rejects_empty_text() {
        let params = NewMessage {
            text: Some(String::new()),
            ..complete()
        };
        assert_missing_fields(build_model(params, None, Timestamp::now()).unwrap_err());
    }

    #[test]
    fn test_build_model_new_message_uses_now_for_both_timestamps() {
        let now = Timestamp::from_millis(1_700_000_000_000);
        let model = build_model(complete(), None, now).unwrap();

        assert_eq!(model.timestamp, now);
        assert_eq!(model.updated_at, now);
        assert_eq!(model.chat_id, "-100200300");
    }

    #[test]
    fn test_build_model_reingest_keeps_first_timestamp() {
        let first_seen = Timestamp::from_millis(1_600_000_000_000);
        let now = Timestamp::from_millis(1_700_000_000_000);
        let model = build_model(complete(), Some(first_seen), now).unwrap();

        assert_eq!(model.timestamp, first_seen);
        assert_eq!(model.updated_at, now);
    }

    #[test]
    fn test_private_whatsapp_message_goes_to_wa_dm() {
        let params = NewMessage {
            source_name: Some(WHATSAPP_SOURCE.to_string()),
            chat_id: Some("79990001122@c.us".to_string()),
            is_private: Some(true),
            ..complete()
        };
        let model = build_model(params, None, Timestamp::now()).unwrap();
        assert_eq!(model.chat_id, "wa-dm");
    }

    #[test]
    fn test_private_message_from_other_source_goes_to_tg_dm() {
        let params = NewMessage {
            is_private: Some(true),
            ..complete()
        };
        let model = build_model(params, None, Timestamp::now()).unwrap();
        assert_eq!(model.chat_id, "tg-dm");
    }

    #[tokio::test]
    async fn test_ingest_stores_and_broadcasts_new_message() {
        let store = MemoryStore::default();
        let (publisher, recorder) = recording_publisher();

        let outcome = ingest(&store, &publisher, complete()).await.unwrap();

        assert_eq!(outcome.operation, Operation::Created);
        assert_eq!(outcome.message_id, "3EB0C767D26A");

        let stored = store.messages.lock().unwrap()["3EB0C767D26A"].clone();
        let broadcast = recorder.messages.lock().unwrap().clone();
        assert_eq!(broadcast.len(), 1);
        assert_eq!(
            broadcast[0],
            serde_json::to_value(Message::from(stored.clone())).unwrap()
        );
        assert_eq!(broadcast[0]["_id"], json!(stored.id.unwrap().to_hex()));
        assert_eq!(broadcast[0]["text"], json!("Wheat sown on field 4"));
    }

    #[tokio::test]
    async fn test_ingest_replaces_message_but_keeps_first_timestamp() {
        let store = MemoryStore::default();
        let (publisher, recorder) = recording_publisher();

        let first_seen = Timestamp::from_millis(1_600_000_000_000);
        let mut earlier = build_model(complete(), None, first_seen).unwrap();
        store.upsert(&mut earlier).await.unwrap();

        let edited = NewMessage {
            text: Some("Wheat sown on field 5".to_string()),
            ..complete()
        };
        let outcome = ingest(&store, &publisher, edited).await.unwrap();
        assert_eq!(outcome.operation, Operation::Updated);

        let stored = store.messages.lock().unwrap()["3EB0C767D26A"].clone();
        assert_eq!(stored.timestamp, first_seen);
        assert_eq!(stored.id, earlier.id);
        assert_eq!(stored.text, "Wheat sown on field 5");
        assert!(stored.updated_at > first_seen);

        let broadcast = recorder.messages.lock().unwrap().clone();
        assert_eq!(broadcast.len(), 1);
        assert_eq!(broadcast[0]["timestamp"], json!("2020-09-13T12:26:40Z"));
        assert_eq!(broadcast[0]["text"], json!("Wheat sown on field 5"));
    }

    #[tokio::test]
    async fn test_ingest_rejects_invalid_message_without_broadcast() {
        let store = MemoryStore::default();
        let (publisher, recorder) = recording_publisher();

        let params = NewMessage {
            text: None,
            ..complete()
        };
        assert_missing_fields(ingest(&store, &publisher, params).await.unwrap_err());

        assert!(store.messages.lock().unwrap().is_empty());
        assert!(recorder.messages.lock().unwrap().is_empty());
    }

    #[test]
    fn test_message_view_renders_object_id_as_hex() {
        let id = Id::parse_str("65f0c1a2b3c4d5e6f7a8b9c0").unwrap();
        let model = Model {
            id: Some(id),
            ..build_model(complete(), None, Timestamp::now()).unwrap()
        };
        let rendered = serde_json::to_value(Message::from(model)).unwrap();

        assert_eq!(rendered["_id"], json!("65f0c1a2b3c4d5e6f7a8b9c0"));
    }

    #[test]
    fn test_message_view_renders_data_and_timestamps() {
        let params = NewMessage {
            data: Some(json!({"crop": "wheat", "area_ha": 12})),
            ..complete()
        };
        let now = Timestamp::from_millis(1_700_000_000_000);
        let message = Message::from(build_model(params, None, now).unwrap());
        let rendered = serde_json::to_value(&message).unwrap();

        assert_eq!(rendered["data"], json!({"crop": "wheat", "area_ha": 12}));
        assert_eq!(rendered["timestamp"], json!("2023-11-14T22:13:20Z"));
        assert!(rendered.get("_id").is_none());
    }
}
