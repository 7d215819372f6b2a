use crate::error::Error;
use async_trait::async_trait;
use crate::events::{DomainEvent, EventPublisher};
use chrono::{DateTime, Utc};
use entity::logs::{self, DEFAULT_LEVEL, DEFAULT_SOURCE};
use entity::Timestamp;
use entity_api::log_entry as log_api;
use log::*;
use mongodb::Database;
use serde::{Deserialize, Serialize};

/// How many entries the log panel loads on open.
pub const RECENT_LIMIT: i64 = 100;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub message: String,
    pub level: String,
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl From<logs::Model> for LogEntry {
    fn from(model: logs::Model) -> Self {
        Self {
            id: model.id.map(|id| id.to_hex()),
            message: model.message,
            level: model.level,
            source: model.source,
            timestamp: model.timestamp.to_chrono(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewLogEntry {
    pub message: Option<String>,
    pub level: Option<String>,
    pub source: Option<String>,
}

impl NewLogEntry {
    pub fn into_model(self, now: Timestamp) -> Result<logs::Model, Error> {
        let message = self
            .message
            .filter(|message| !message.is_empty())
            .ok_or_else(|| Error::invalid("Message is required"))?;

        Ok(logs::Model {
            id: None,
            message,
            level: self.level.unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
            source: self.source.unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
            timestamp: now,
        })
    }
}

pub async fn find_recent(db: &Database) -> Result<Vec<LogEntry>, Error> {
    let entries = log_api::find_recent(db, RECENT_LIMIT).await?;
    Ok(entries.into_iter().map(LogEntry::from).collect())
}

/// Where submitted log entries are persisted.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Returns the entry with its assigned `_id`.
    async fn create(&self, entry: logs::Model) -> Result<logs::Model, Error>;
}

#[async_trait]
impl LogStore for Database {
    async fn create(&self, entry: logs::Model) -> Result<logs::Model, Error> {
        Ok(log_api::create(self, entry).await?)
    }
}

/// Stores the entry and streams it to every open log viewer.
pub async fn submit<S: LogStore + ?Sized>(
    store: &S,
    event_publisher: &EventPublisher,
    params: NewLogEntry,
) -> Result<LogEntry, Error> {
    let model = params.into_model(Timestamp::now())?;
    let entry = LogEntry::from(store.create(model).await?);

    match serde_json::to_value(&entry) {
        Ok(entry) => {
            event_publisher
                .publish(DomainEvent::LogSubmitted { entry })
                .await
        }
        Err(e) => warn!("Failed to serialize log entry for live viewers: {e}"),
    }

    Ok(entry)
}
