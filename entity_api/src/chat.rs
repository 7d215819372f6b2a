use super::error::{EntityApiErrorKind, Error};
use entity::chats::{Model, COLLECTION};
use entity::Id;
use futures::TryStreamExt;
use log::*;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

fn collection(db: &Database) -> Collection<Model> {
    db.collection(COLLECTION)
}

pub async fn find_by_source(db: &Database, source_name: &str) -> Result<Vec<Model>, Error> {
    let cursor = collection(db)
        .find(doc! { "source_name": source_name })
        .await?;

    Ok(cursor.try_collect().await?)
}

pub async fn find_by_chat_id(db: &Database, chat_id: &str) -> Result<Option<Model>, Error> {
    Ok(collection(db)
        .find_one(doc! { "chat_id": chat_id })
        .await?)
}

pub async fn find_by_chat_id_and_source(
    db: &Database,
    chat_id: &str,
    source_name: &str,
) -> Result<Option<Model>, Error> {
    Ok(collection(db)
        .find_one(doc! { "chat_id": chat_id, "source_name": source_name })
        .await?)
}

pub async fn create(db: &Database, chat: &Model) -> Result<Id, Error> {
    debug!("New Chat to be inserted: {chat:?}");

    let result = collection(db).insert_one(chat).await?;

    result.inserted_id.as_object_id().ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::Other,
    })
}

/// Outcome of a partial chat update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: bool,
    pub modified: bool,
}

/// Applies `$set` with `fields` to the chat.
pub async fn update(
    db: &Database,
    chat_id: &str,
    fields: Document,
) -> Result<UpdateOutcome, Error> {
    debug!("Updating Chat {chat_id} with: {fields:?}");

    let result = collection(db)
        .update_one(doc! { "chat_id": chat_id }, doc! { "$set": fields })
        .await?;

    Ok(UpdateOutcome {
        matched: result.matched_count > 0,
        modified: result.modified_count > 0,
    })
}

/// Returns false when no chat had that id.
pub async fn delete_by_chat_id(db: &Database, chat_id: &str) -> Result<bool, Error> {
    let result = collection(db)
        .delete_one(doc! { "chat_id": chat_id })
        .await?;

    Ok(result.deleted_count > 0)
}
