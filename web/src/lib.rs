use axum::http::{header::CONTENT_TYPE, HeaderValue, Method};
use domain::events::EventPublisher;
use log::*;
use mongodb::Database;
use service::config::Config;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};

mod controller;
mod error;
mod params;
pub mod router;
mod sse;

pub use error::{Error, Result};

/// Router state: infrastructure from `service` plus the live-update plumbing.
#[derive(Clone)]
pub struct AppState {
    service_state: service::AppState,
    pub sse_manager: Arc<::sse::Manager>,
    pub event_publisher: Arc<EventPublisher>,
}

impl AppState {
    pub fn new(
        service_state: service::AppState,
        sse_manager: Arc<::sse::Manager>,
        event_publisher: EventPublisher,
    ) -> Self {
        Self {
            service_state,
            sse_manager,
            event_publisher: Arc::new(event_publisher),
        }
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }

    /// Database holding chats and messages.
    pub fn db(&self) -> Database {
        self.service_state.db()
    }

    pub fn logs_db(&self) -> Database {
        self.service_state.logs_db()
    }

    pub fn users_db(&self) -> Database {
        self.service_state.users_db()
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
}

pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let host = app_state
        .config()
        .interface
        .clone()
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let server_url = format!("{host}:{}", app_state.config().port);

    info!("Server starting... listening for connections on http://{server_url}");

    let cors = cors_layer(&app_state.config().allowed_origins);
    let listener = TcpListener::bind(&server_url).await?;

    axum::serve(listener, router::define_routes(app_state).layer(cors)).await
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // A header value can't contain a newline; it must be dropped, not panic.
        let _layer = cors_layer(&[
            "http://localhost:3000".to_string(),
            "http://bad\norigin".to_string(),
        ]);
    }
}
