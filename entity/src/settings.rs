use crate::{Id, Timestamp};
use serde::{Deserialize, Serialize};

pub const COLLECTION: &str = "settings";

/// `setting_type` of the document holding the WhatsApp login QR code.
pub const WHATSAPP_QR: &str = "whatsapp_qr";

/// One row of the shared settings collection, keyed by `setting_type`.
/// Only the fields every setting carries are modelled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<Id>,
    pub setting_type: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}
