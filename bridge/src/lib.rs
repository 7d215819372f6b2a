//! Chat platform bridge.
//!
//! A platform client (the process logged into the messenger) posts its
//! events to `POST /events`. The [`forwarder::Forwarder`] turns each one into
//! calls on the admin panel: group chats are registered on request, messages
//! are forwarded to the ingest endpoint, login QR codes are uploaded for the
//! dashboard. Outgoing texts, images and files, including the bridge's own
//! replies, go back out through a [`transport::ChatTransport`].

pub mod config;
pub mod error;
pub mod forwarder;
pub mod gateway;
pub mod message;
pub mod server;
pub mod transport;

pub use error::Error;

use config::BridgeConfig;
use forwarder::Forwarder;
use gateway::DataService;
use log::*;
use server::ServerState;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use transport::ChatTransport;

/// Platform events waiting for the forwarder before `POST /events` blocks.
const EVENT_BUFFER: usize = 256;

/// Runs the HTTP surface and the forwarder until the listener fails.
pub async fn serve(config: BridgeConfig, transport: Arc<dyn ChatTransport>) -> Result<(), Error> {
    let client = gateway::build_client(&config)?;
    let data_service = DataService::from_config(client, &config);

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let forwarder = Forwarder::new(data_service, Arc::clone(&transport), config.source_name.clone());
    tokio::spawn(forwarder.run(events_rx));

    let listen_address = config.listen_address();
    let listener = TcpListener::bind(&listen_address).await?;
    info!("Bridge listening on http://{listen_address}");

    axum::serve(
        listener,
        server::define_routes(ServerState::new(transport, events_tx)),
    )
    .await?;

    Ok(())
}
