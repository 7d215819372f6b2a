//! Business rules of the admin panel: what makes a message, chat, log entry, setting or
//! account valid, and which live viewers hear about a change.
//!
//! Consumers of this crate never need `entity_api` directly; the JSON-facing
//! views (`message::Message`, `chat::Chat`, ...) are defined here.
pub use entity::Id;
pub use events;

pub mod chat;
pub mod error;
pub mod log_entry;
pub mod message;
pub mod setting;
pub mod user;

use mongodb::Database;

/// Creates the indexes the queries in this crate rely on.
pub async fn ensure_indexes(
    chat_db: &Database,
    logs_db: &Database,
    users_db: &Database,
) -> Result<(), error::Error> {
    Ok(entity_api::indexes::ensure_indexes(chat_db, logs_db, users_db).await?)
}
