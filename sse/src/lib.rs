//! Server-Sent Events (SSE) infrastructure for live dashboard updates.
//!
//! # Architecture
//!
//! - **Two channels**: `Messages` carries ingested chat messages and periodic
//!   heartbeats, `Logs` carries submitted log entries. Every viewer of a
//!   channel receives every event on it.
//! - **Single registry**: connections are keyed by a server-generated,
//!   increasing `ConnectionId`; the id is what clients see as `clientId`.
//! - **Best effort**: events are ephemeral. A viewer that is offline misses
//!   them and reloads history over the REST API. A send that fails removes
//!   the connection from the registry.
//! - **Unnamed frames**: every event is written as a bare `data:` frame whose
//!   body is JSON, so browser `EventSource#onmessage` sees all of them.
//!
//! # Message Flow
//!
//! 1. Dashboard opens `/api/chats/stream_messages` or `/api/logs/stream`
//! 2. The web handler registers the connection and sends a greeting frame
//! 3. A message is ingested (or a log submitted) and a `DomainEvent` is published
//! 4. `SseDomainEventHandler` turns it into a broadcast on the right channel
//! 5. When the client disconnects its stream ends and the connection is unregistered
//!
//! # Modules
//!
//! - `connection`: ConnectionRegistry, ConnectionId and Channel
//! - `manager`: High-level message routing and the heartbeat task
//! - `message`: Event payloads and scopes
//! - `domain_event_handler`: bridge from `events::DomainEvent` to broadcasts

pub mod connection;
pub mod domain_event_handler;
pub mod manager;
pub mod message;

pub use connection::{Channel, ConnectionId};
pub use manager::Manager;
