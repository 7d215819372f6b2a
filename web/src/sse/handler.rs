use crate::AppState;
use async_stream::stream;
use axum::extract::State;
use axum::http::header::CACHE_CONTROL;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use chrono::Utc;
use futures::Stream;
use log::*;
use sse::message::{Event as SseEvent, Message as SseMessage, MessageScope};
use sse::{Channel, ConnectionId, Manager};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Comment frames on the log stream keep idle proxies from closing it.
const LOG_STREAM_KEEPALIVE: Duration = Duration::from_secs(30);

/// Unregisters its connection when the response stream is dropped, which is
/// how a client disconnect surfaces.
struct ConnectionGuard {
    manager: Arc<Manager>,
    connection_id: ConnectionId,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        debug!(
            "SSE connection {} closed, cleaning up",
            self.connection_id
        );
        self.manager.unregister_connection(&self.connection_id);
    }
}

/// Registers a connection on `channel`, queues `greeting` as its first frame
/// and returns the stream that drains it.
fn open_stream(
    manager: &Arc<Manager>,
    channel: Channel,
    greeting: impl FnOnce(ConnectionId) -> SseEvent,
) -> impl Stream<Item = Result<Event, Infallible>> {
    let (tx, mut rx) = mpsc::unbounded_channel();

    let connection_id = manager.register_connection(channel, tx);
    manager.send_message(SseMessage {
        event: greeting(connection_id),
        scope: MessageScope::Connection { connection_id },
    });

    let guard = ConnectionGuard {
        manager: Arc::clone(manager),
        connection_id,
    };

    stream! {
        let _guard = guard;
        while let Some(event) = rx.recv().await {
            yield event;
        }
    }
}

/// Live feed of ingested chat messages plus periodic heartbeats.
pub(crate) async fn messages_stream(State(app_state): State<AppState>) -> impl IntoResponse {
    debug!("Establishing SSE message stream");

    let stream = open_stream(&app_state.sse_manager, Channel::Messages, |connection_id| {
        SseEvent::ConnectionEstablished {
            client_id: connection_id.value(),
            timestamp: Utc::now(),
        }
    });

    // Heartbeats travel as data frames, so no comment keep-alive here
    ([(CACHE_CONTROL, "no-cache, no-transform")], Sse::new(stream))
}

/// Live feed of submitted log entries.
pub(crate) async fn logs_stream(
    State(app_state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    debug!("Establishing SSE log stream");

    let stream = open_stream(&app_state.sse_manager, Channel::Logs, |_| {
        SseEvent::LogStreamConnected
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(LOG_STREAM_KEEPALIVE)
            .text("keepalive"),
    )
}
