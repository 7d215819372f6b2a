use super::error::Error;
use entity::messages::{Model, COLLECTION};
use futures::TryStreamExt;
use log::*;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

/// Whether an upsert replaced an existing message or inserted a new one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Created,
    Updated,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Created => "created",
            Operation::Updated => "updated",
        }
    }
}

fn collection(db: &Database) -> Collection<Model> {
    db.collection(COLLECTION)
}

pub async fn find_by_message_id(db: &Database, message_id: &str) -> Result<Option<Model>, Error> {
    Ok(collection(db)
        .find_one(doc! { "message_id": message_id })
        .await?)
}

/// Replaces the message keyed by `message_id`, inserting it when absent.
/// On insert, `message.id` is filled in with the new document's `_id`.
pub async fn upsert(db: &Database, message: &mut Model) -> Result<Operation, Error> {
    debug!("Upserting message {}", message.message_id);

    let result = collection(db)
        .replace_one(doc! { "message_id": &message.message_id }, &*message)
        .upsert(true)
        .await?;

    match result.upserted_id {
        Some(id) => {
            message.id = id.as_object_id();
            Ok(Operation::Created)
        }
        None => Ok(Operation::Updated),
    }
}

/// All messages of a chat, oldest first.
pub async fn find_by_chat_id(db: &Database, chat_id: &str) -> Result<Vec<Model>, Error> {
    let cursor = collection(db)
        .find(doc! { "chat_id": chat_id })
        .sort(doc! { "timestamp": 1 })
        .await?;

    Ok(cursor.try_collect().await?)
}
