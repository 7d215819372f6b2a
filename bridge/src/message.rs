//! What a platform client reports, and what the bridge forwards.
use crate::error::Error;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChatInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_group: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct Contact {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub pushname: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
}

impl Contact {
    /// The best human-readable name the platform knows for this contact.
    pub fn display_name(&self) -> &str {
        [&self.name, &self.pushname, &self.number]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|name| !name.is_empty())
            .unwrap_or("Unknown")
    }
}

/// Downloaded attachment, `data` already base64 encoded.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Media {
    pub mimetype: String,
    pub data: String,
}

impl Media {
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mimetype, self.data)
    }
}

/// Outgoing image or document, handed to the platform client as base64.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attachment {
    pub mimetype: String,
    pub data: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

impl Attachment {
    /// Parses `data:<mimetype>;base64,<payload>`. The mimetype may be left
    /// out, in which case the payload is treated as opaque bytes.
    pub fn from_data_uri(uri: &str) -> Result<Self, Error> {
        let (header, data) = uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| Error::invalid("Invalid data URI format"))?;

        let mimetype = header
            .strip_suffix(";base64")
            .ok_or_else(|| Error::invalid("Data URI must be base64 encoded"))?;

        BASE64
            .decode(data)
            .map_err(|_| Error::invalid("Data URI payload is not valid base64"))?;

        Ok(Self {
            mimetype: if mimetype.is_empty() {
                DEFAULT_MIMETYPE.to_string()
            } else {
                mimetype.to_string()
            },
            data: data.to_string(),
            filename: None,
            caption: None,
        })
    }

    pub fn with_filename(mut self, filename: Option<String>) -> Self {
        self.filename = filename.filter(|filename| !filename.is_empty());
        self
    }

    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption.filter(|caption| !caption.is_empty());
        self
    }
}

const DEFAULT_MIMETYPE: &str = "application/octet-stream";

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct InboundMessage {
    pub id: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub from_me: bool,
    pub chat: ChatInfo,
    pub contact: Contact,
    #[serde(default)]
    pub media: Option<Media>,
}

/// Events a platform client delivers, tagged by `type`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeEvent {
    /// A login QR code needs scanning.
    Qr { code: String },
    Authenticated,
    AuthFailure { message: String },
    /// The client is online as `account_id`.
    Ready { account_id: String },
    Message(InboundMessage),
    /// Participants were added to a group.
    GroupJoin {
        chat: ChatInfo,
        recipient_ids: Vec<String>,
    },
}

/// The message record the ingest endpoint accepts.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub message_id: String,
    pub source_name: String,
    pub chat_id: String,
    pub text: String,
    pub sender_id: String,
    pub sender_name: String,
    pub is_private: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}
