use mongodb::bson::oid::ObjectId;
use std::str::FromStr;

pub use entity::{chats, logs, messages, settings, users, Id, Timestamp};

pub mod chat;
pub mod error;
pub mod indexes;
pub mod log_entry;
pub mod message;
pub mod setting;
pub mod user;

/// Parses a hex ObjectId coming from a URL or query string.
pub fn parse_object_id(id: &str) -> Result<Id, error::Error> {
    Ok(ObjectId::from_str(id)?)
}
