use crate::{Id, Timestamp};
use bson::Bson;
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "messages";

/// Chat id that all private WhatsApp conversations are folded into.
pub const WHATSAPP_DIRECT_CHAT_ID: &str = "wa-dm";
/// Chat id that all private conversations from every other source are folded into.
pub const OTHER_DIRECT_CHAT_ID: &str = "tg-dm";

/// A chat message forwarded by one of the messenger bridges.
///
/// `message_id` is the natural key: re-ingesting a message with the same id
/// replaces the document but keeps its original `timestamp`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub message_id: String,
    pub source_name: String,
    pub chat_id: String,
    pub text: String,
    #[serde(default)]
    pub sender_id: Option<String>,
    pub sender_name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub data: Option<Bson>,
    pub timestamp: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default)]
    pub is_private: Option<bool>,
}
