use super::error::{EntityApiErrorKind, Error};
use entity::logs::{Model, COLLECTION};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

fn collection(db: &Database) -> Collection<Model> {
    db.collection(COLLECTION)
}

/// The `limit` most recent entries, newest first.
pub async fn find_recent(db: &Database, limit: i64) -> Result<Vec<Model>, Error> {
    let cursor = collection(db)
        .find(doc! {})
        .sort(doc! { "timestamp": -1 })
        .limit(limit)
        .await?;

    Ok(cursor.try_collect().await?)
}

/// Inserts the entry and returns it with its assigned `_id`.
pub async fn create(db: &Database, mut entry: Model) -> Result<Model, Error> {
    let result = collection(db).insert_one(&entry).await?;

    entry.id = Some(result.inserted_id.as_object_id().ok_or(Error {
        source: None,
        error_kind: EntityApiErrorKind::Other,
    })?);

    Ok(entry)
}
