use crate::{Id, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "chats";

/// A monitored (or monitorable) chat on one of the messenger sources.
/// `(chat_id, source_name)` identifies a chat; new chats start inactive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub chat_id: String,
    pub chat_name: String,
    pub source_name: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setting_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
