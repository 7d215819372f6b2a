//! The outgoing side of a chat platform.
use crate::error::Error;
use crate::message::Attachment;
use async_trait::async_trait;
use log::*;
use serde::Serialize;
use serde_json::json;

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Delivers `text` to a chat or user on the platform.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), Error>;

    /// Delivers an image, shown inline, with its optional caption.
    async fn send_image(&self, chat_id: &str, image: &Attachment) -> Result<(), Error>;

    /// Delivers a document under its optional filename.
    async fn send_file(&self, chat_id: &str, file: &Attachment) -> Result<(), Error>;
}

/// Sends through a platform client that exposes `POST <uri>/send_message`,
/// `/send_image` and `/send_file`.
pub struct HttpTransport {
    client: reqwest::Client,
    platform_uri: String,
}

#[derive(Serialize)]
struct AttachmentRequest<'a> {
    chat_id: &'a str,
    #[serde(flatten)]
    attachment: &'a Attachment,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, platform_uri: &str) -> Self {
        Self {
            client,
            platform_uri: platform_uri.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        chat_id: &str,
        body: &T,
    ) -> Result<(), Error> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.platform_uri))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            warn!("Platform client refused {endpoint} to {chat_id}: {status} {reason}");
            return Err(Error::transport(format!(
                "Platform client responded with {status}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), Error> {
        self.post(
            "send_message",
            chat_id,
            &json!({ "chat_id": chat_id, "text": text }),
        )
        .await
    }

    async fn send_image(&self, chat_id: &str, image: &Attachment) -> Result<(), Error> {
        let body = AttachmentRequest {
            chat_id,
            attachment: image,
        };
        self.post("send_image", chat_id, &body).await
    }

    async fn send_file(&self, chat_id: &str, file: &Attachment) -> Result<(), Error> {
        let body = AttachmentRequest {
            chat_id,
            attachment: file,
        };
        self.post("send_file", chat_id, &body).await
    }
}
