use super::error::{EntityApiErrorKind, Error};
use entity::users::{Model, COLLECTION};
use entity::Id;
use futures::TryStreamExt;
use log::*;
use mongodb::bson::{doc, Document};
use mongodb::{Collection, Database};

fn collection(db: &Database) -> Collection<Model> {
    db.collection(COLLECTION)
}

pub async fn find_all(db: &Database) -> Result<Vec<Model>, Error> {
    let cursor = collection(db).find(doc! {}).await?;
    Ok(cursor.try_collect().await?)
}

pub async fn find_by_username(db: &Database, username: &str) -> Result<Option<Model>, Error> {
    Ok(collection(db)
        .find_one(doc! { "username": username })
        .await?)
}

pub async fn find_by_id(db: &Database, id: Id) -> Result<Option<Model>, Error> {
    Ok(collection(db).find_one(doc! { "_id": id }).await?)
}

pub async fn create(db: &Database, user: &Model) -> Result<Id, Error> {
    debug!("New User to be inserted: {}", user.username);

    let result = collection(db).insert_one(user).await?;

    result.inserted_id.as_object_id().ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::Other,
    })
}

/// Returns false when no user had that id.
pub async fn delete_by_id(db: &Database, id: Id) -> Result<bool, Error> {
    let result = collection(db).delete_one(doc! { "_id": id }).await?;
    Ok(result.deleted_count > 0)
}

/// Applies `$set` with `fields`; returns false when no user had that id.
pub async fn update(db: &Database, id: Id, fields: Document) -> Result<bool, Error> {
    debug!("Updating User {id} fields {:?}", fields.keys().collect::<Vec<_>>());

    let result = collection(db)
        .update_one(doc! { "_id": id }, doc! { "$set": fields })
        .await?;

    Ok(result.matched_count > 0)
}
