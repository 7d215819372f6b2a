//! SSE HTTP handlers for the web layer.
//!
//! Only the Axum handlers live here. The connection registry, event payloads
//! and the heartbeat task are in the `sse` crate so `domain` events can reach
//! them without depending on `web`.

pub mod handler;
