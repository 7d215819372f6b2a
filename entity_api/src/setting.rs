use super::error::Error;
use entity::settings::{Model, COLLECTION};
use entity::Timestamp;
use log::*;
use mongodb::bson::doc;
use mongodb::{Collection, Database};

fn collection(db: &Database) -> Collection<Model> {
    db.collection(COLLECTION)
}

pub async fn find_by_type(db: &Database, setting_type: &str) -> Result<Option<Model>, Error> {
    Ok(collection(db)
        .find_one(doc! { "setting_type": setting_type })
        .await?)
}

/// Sets `value` on the setting of that type, creating it when absent.
pub async fn upsert_value(
    db: &Database,
    setting_type: &str,
    value: &str,
    now: Timestamp,
) -> Result<(), Error> {
    debug!("Saving setting {setting_type}");

    collection(db)
        .update_one(
            doc! { "setting_type": setting_type },
            doc! { "$set": { "value": value, "updated_at": now } },
        )
        .upsert(true)
        .await?;

    Ok(())
}
