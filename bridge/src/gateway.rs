//! HTTP client for the admin panel and the message processing service.
use crate::config::BridgeConfig;
use crate::error::Error;
use crate::message::{ChatInfo, OutboundMessage};
use log::*;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const UNKNOWN_GROUP: &str = "Unknown Group";

pub fn build_client(config: &BridgeConfig) -> Result<reqwest::Client, Error> {
    Ok(reqwest::Client::builder()
        .use_rustls_tls()
        .timeout(Duration::from_secs(config.http_timeout_secs))
        .build()?)
}

#[derive(Debug, Default, Deserialize)]
struct RegistrationResponse {
    #[serde(default)]
    success: bool,
}

pub struct DataService {
    client: reqwest::Client,
    data_service_uri: String,
    message_processing_uri: String,
}

impl DataService {
    pub fn new(
        client: reqwest::Client,
        data_service_uri: &str,
        message_processing_uri: &str,
    ) -> Self {
        Self {
            client,
            data_service_uri: data_service_uri.trim_end_matches('/').to_string(),
            message_processing_uri: message_processing_uri.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &BridgeConfig) -> Self {
        Self::new(
            client,
            &config.data_service_uri,
            &config.message_processing_uri,
        )
    }

    /// Registers a group chat with the admin panel. A chat the panel already
    /// knows (`409`) counts as registered.
    pub async fn register_chat(&self, chat: &ChatInfo, source_name: &str) -> Result<bool, Error> {
        let chat_name = chat
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_GROUP);

        let response = self
            .client
            .post(format!("{}/api/chats", self.data_service_uri))
            .json(&json!({
                "chat_id": chat.id,
                "chat_name": chat_name,
                "source_name": source_name,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            debug!("Chat {} was already registered", chat.id);
            return Ok(true);
        }
        if !status.is_success() {
            warn!("Registering chat {} failed with status {status}", chat.id);
            return Ok(false);
        }

        let body: RegistrationResponse = response.json().await?;
        Ok(body.success)
    }

    /// Uploads a login QR code so the dashboard can display it.
    pub async fn publish_qr(&self, code: &str) -> Result<(), Error> {
        self.client
            .post(format!("{}/api/settings/whatsapp_qr", self.data_service_uri))
            .json(&json!({ "qr_code": code }))
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn forward(&self, message: &OutboundMessage) -> Result<(), Error> {
        self.client
            .post(format!("{}/new_message", self.message_processing_uri))
            .json(message)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
