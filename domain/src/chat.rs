use crate::error::Error;
use chrono::{DateTime, Utc};
use entity::{chats, Timestamp};
use entity_api::chat as chat_api;
use log::*;
use mongodb::bson::{doc, Bson, Document};
use mongodb::Database;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The columns the chat picker needs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatSummary {
    pub chat_id: String,
    pub chat_name: String,
    pub active: bool,
    pub source_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting_id: Option<String>,
}

impl From<chats::Model> for ChatSummary {
    fn from(model: chats::Model) -> Self {
        Self {
            chat_id: model.chat_id,
            chat_name: model.chat_name,
            active: model.active,
            source_name: model.source_name,
            setting_id: model.setting_id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Chat {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub chat_id: String,
    pub chat_name: String,
    pub source_name: String,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<chats::Model> for Chat {
    fn from(model: chats::Model) -> Self {
        Self {
            id: model.id.map(|id| id.to_hex()),
            chat_id: model.chat_id,
            chat_name: model.chat_name,
            source_name: model.source_name,
            active: model.active,
            template_id: model.template_id,
            setting_id: model.setting_id,
            created_at: model.created_at.map(|at| at.to_chrono()),
            updated_at: model.updated_at.map(|at| at.to_chrono()),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewChat {
    pub chat_id: Option<String>,
    pub chat_name: Option<String>,
    pub source_name: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CreatedChat {
    pub chat_id: String,
    pub inserted_id: String,
}

/// Partial update. Each field is absent (`None`), explicitly `null`
/// (`Some(None)`) or set. `active` stays untyped so a non-boolean can be
/// rejected with a message instead of a deserialization failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChatUpdate {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub active: Option<Option<Value>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub template_id: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub setting_id: Option<Option<String>>,
}

/// Only called when the field exists, so `null` becomes `Some(None)`.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

fn nullable(value: Option<String>) -> Bson {
    value.map(Bson::String).unwrap_or(Bson::Null)
}

impl ChatUpdate {
    /// The `$set` document for this update, always touching `updated_at`.
    /// An explicit `null` detaches a template or setting.
    pub fn into_set_document(self, now: Timestamp) -> Result<Document, Error> {
        let mut fields = doc! { "updated_at": now };

        if let Some(active) = self.active {
            let active = active
                .as_ref()
                .and_then(Value::as_bool)
                .ok_or_else(|| Error::invalid("active status must be a boolean"))?;
            fields.insert("active", active);
        }
        if let Some(template_id) = self.template_id {
            fields.insert("template_id", nullable(template_id));
        }
        if let Some(setting_id) = self.setting_id {
            fields.insert("setting_id", nullable(setting_id));
        }

        Ok(fields)
    }
}

pub async fn find_by_source(
    db: &Database,
    source_name: Option<&str>,
) -> Result<Vec<ChatSummary>, Error> {
    let source_name = source_name
        .filter(|source| !source.is_empty())
        .ok_or_else(|| Error::invalid("source_name parameter is required"))?;

    let chats = chat_api::find_by_source(db, source_name).await?;
    Ok(chats.into_iter().map(ChatSummary::from).collect())
}

pub async fn find_by_chat_id(db: &Database, chat_id: &str) -> Result<Chat, Error> {
    chat_api::find_by_chat_id(db, chat_id)
        .await?
        .map(Chat::from)
        .ok_or_else(|| Error::not_found("Chat not found"))
}

/// Registers a chat. New chats start inactive until an operator enables them.
pub async fn create(db: &Database, params: NewChat) -> Result<CreatedChat, Error> {
    let (chat_id, chat_name, source_name) =
        match (params.chat_id, params.chat_name, params.source_name) {
            (Some(chat_id), Some(chat_name), Some(source_name))
                if !chat_id.is_empty() && !chat_name.is_empty() && !source_name.is_empty() =>
            {
                (chat_id, chat_name, source_name)
            }
            _ => {
                return Err(Error::invalid(
                    "chat_id, chat_name, and source_name are required",
                ))
            }
        };

    if chat_api::find_by_chat_id_and_source(db, &chat_id, &source_name)
        .await?
        .is_some()
    {
        return Err(Error::conflict(
            "Chat with this ID and source already exists",
        ));
    }

    let model = chats::Model {
        id: None,
        chat_id,
        chat_name,
        source_name,
        active: false,
        template_id: None,
        setting_id: None,
        created_at: Some(Timestamp::now()),
        updated_at: None,
    };

    let inserted_id = chat_api::create(db, &model).await?;
    info!("Registered chat {} from {}", model.chat_id, model.source_name);

    Ok(CreatedChat {
        chat_id: model.chat_id,
        inserted_id: inserted_id.to_hex(),
    })
}

/// Returns whether the stored chat changed.
pub async fn update(db: &Database, chat_id: &str, params: ChatUpdate) -> Result<bool, Error> {
    let fields = params.into_set_document(Timestamp::now())?;

    let outcome = chat_api::update(db, chat_id, fields).await?;
    if !outcome.matched {
        return Err(Error::not_found("Chat not found"));
    }

    Ok(outcome.modified)
}

pub async fn delete(db: &Database, chat_id: &str) -> Result<(), Error> {
    if !chat_api::delete_by_chat_id(db, chat_id).await? {
        return Err(Error::not_found("Chat not found"));
    }
    Ok(())
}
