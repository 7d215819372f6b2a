//! Decides what happens to each platform event.
use crate::gateway::DataService;
use crate::message::{BridgeEvent, ChatInfo, InboundMessage, OutboundMessage};
use crate::transport::ChatTransport;
use log::*;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Exact message text that enables monitoring of a group.
pub const MONITOR_COMMAND: &str = "/monitor";
/// Phrase ("watch this chat") that enables monitoring when found anywhere in a message.
pub const MONITOR_PHRASE: &str = "следи за этим чатом";
pub const MONITORING_ACTIVATED: &str =
    "Chat monitoring has been activated. I will now process messages from this group.";

/// What became of one inbound message.
#[derive(Clone, Debug, PartialEq)]
pub enum Handled {
    /// Sent by the bridge account itself.
    OwnMessage,
    /// The chat is now monitored.
    Registered,
    /// A monitor command whose registration the admin panel did not accept.
    RegistrationFailed,
    /// Group chat that nobody asked to monitor.
    Unmonitored,
    Forwarded,
    ForwardFailed,
}

pub fn is_monitor_command(body: &str) -> bool {
    body == MONITOR_COMMAND || body.to_lowercase().contains(MONITOR_PHRASE)
}

pub struct Forwarder {
    data_service: DataService,
    transport: Arc<dyn ChatTransport>,
    source_name: String,
    registered_chats: HashSet<String>,
    account_id: Option<String>,
}

impl Forwarder {
    pub fn new(
        data_service: DataService,
        transport: Arc<dyn ChatTransport>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            data_service,
            transport,
            source_name: source_name.into(),
            registered_chats: HashSet::new(),
            account_id: None,
        }
    }

    pub fn is_registered(&self, chat_id: &str) -> bool {
        self.registered_chats.contains(chat_id)
    }

    /// Handles events in arrival order until every sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<BridgeEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event).await;
        }
        info!("Platform event channel closed, forwarder stopping");
    }

    pub async fn handle_event(&mut self, event: BridgeEvent) {
        match event {
            BridgeEvent::Qr { code } => self.handle_qr(&code).await,
            BridgeEvent::Authenticated => info!("Platform authentication successful"),
            BridgeEvent::AuthFailure { message } => error!("Platform authentication failure: {message}"),
            BridgeEvent::Ready { account_id } => {
                info!("Bridge is ready and online as {account_id}");
                self.account_id = Some(account_id);
            }
            BridgeEvent::Message(message) => {
                let handled = self.handle_message(message).await;
                trace!("Message handled: {handled:?}");
            }
            BridgeEvent::GroupJoin {
                chat,
                recipient_ids,
            } => self.handle_group_join(&chat, &recipient_ids),
        }
    }

    pub async fn handle_qr(&self, code: &str) {
        info!("QR code received, scan it from the dashboard to authenticate");
        match self.data_service.publish_qr(code).await {
            Ok(()) => info!("QR code sent to data service"),
            Err(e) => error!("Failed to send QR code to data service: {e}"),
        }
    }

    fn handle_group_join(&self, chat: &ChatInfo, recipient_ids: &[String]) {
        let Some(account_id) = &self.account_id else {
            return;
        };
        if recipient_ids.iter().any(|id| id == account_id) {
            info!(
                "Bridge was added to group: {}",
                chat.name.as_deref().unwrap_or(&chat.id)
            );
        }
    }

    pub async fn handle_message(&mut self, message: InboundMessage) -> Handled {
        if message.from_me {
            return Handled::OwnMessage;
        }

        let chat_id = message.chat.id.clone();
        let is_group = message.chat.is_group;

        if is_group && !self.is_registered(&chat_id) && is_monitor_command(&message.body) {
            return self.register(&message.chat).await;
        }

        if is_group && !self.is_registered(&chat_id) {
            return Handled::Unmonitored;
        }

        let outbound = self.to_outbound(message);
        match self.data_service.forward(&outbound).await {
            Ok(()) => {
                info!(
                    "{} from {} forwarded to processing service",
                    if outbound.is_private {
                        "Private message"
                    } else {
                        "Group message"
                    },
                    outbound.sender_name
                );
                Handled::Forwarded
            }
            Err(e) => {
                error!("Error forwarding message {}: {e}", outbound.message_id);
                Handled::ForwardFailed
            }
        }
    }

    async fn register(&mut self, chat: &ChatInfo) -> Handled {
        match self.data_service.register_chat(chat, &self.source_name).await {
            Ok(true) => {
                self.registered_chats.insert(chat.id.clone());
                info!(
                    "Registered chat: {} ({})",
                    chat.name.as_deref().unwrap_or_default(),
                    chat.id
                );
            }
            Ok(false) => {
                warn!("Data service did not accept chat {}", chat.id);
                return Handled::RegistrationFailed;
            }
            Err(e) => {
                error!("Failed to register chat {}: {e}", chat.id);
                return Handled::RegistrationFailed;
            }
        }

        if let Err(e) = self.transport.send_text(&chat.id, MONITORING_ACTIVATED).await {
            warn!("Failed to confirm monitoring in {}: {e}", chat.id);
        }

        Handled::Registered
    }

    pub fn to_outbound(&self, message: InboundMessage) -> OutboundMessage {
        let sender_name = message.contact.display_name().to_string();

        OutboundMessage {
            message_id: message.id,
            source_name: self.source_name.clone(),
            chat_id: message.chat.id,
            text: message.body,
            sender_id: message.contact.id,
            sender_name,
            is_private: !message.chat.is_group,
            image: message.media.as_ref().map(|media| media.data_url()),
        }
    }
}
