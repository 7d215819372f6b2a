//! Index definitions applied at startup. `create_index` is a no-op when an
//! identical index already exists, so this runs on every boot.
use super::error::Error;
use entity::{chats, logs, messages, users};
use log::*;
use mongodb::bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};

fn index(keys: Document, unique: bool) -> IndexModel {
    IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(unique).build())
        .build()
}

pub async fn ensure_indexes(
    chat_db: &Database,
    logs_db: &Database,
    users_db: &Database,
) -> Result<(), Error> {
    let messages = chat_db.collection::<Document>(messages::COLLECTION);
    messages
        .create_index(index(doc! { "message_id": 1 }, true))
        .await?;
    messages
        .create_index(index(doc! { "chat_id": 1, "timestamp": 1 }, false))
        .await?;

    chat_db
        .collection::<Document>(chats::COLLECTION)
        .create_index(index(doc! { "chat_id": 1, "source_name": 1 }, false))
        .await?;

    logs_db
        .collection::<Document>(logs::COLLECTION)
        .create_index(index(doc! { "timestamp": -1 }, false))
        .await?;

    users_db
        .collection::<Document>(users::COLLECTION)
        .create_index(index(doc! { "username": 1 }, true))
        .await?;

    info!("MongoDB indexes ensured");

    Ok(())
}
