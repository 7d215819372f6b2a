//! The bridge's own HTTP surface.
use crate::error::Error;
use crate::message::{Attachment, BridgeEvent};
use crate::transport::ChatTransport;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use log::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct ServerState {
    transport: Arc<dyn ChatTransport>,
    events: mpsc::Sender<BridgeEvent>,
}

impl ServerState {
    pub fn new(transport: Arc<dyn ChatTransport>, events: mpsc::Sender<BridgeEvent>) -> Self {
        Self { transport, events }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SendMessageParams {
    pub user: Option<String>,
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendImageParams {
    pub user: Option<String>,
    /// `data:<mimetype>;base64,<payload>`
    pub image: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SendFileParams {
    pub user: Option<String>,
    /// `data:<mimetype>;base64,<payload>`
    pub file: Option<String>,
    pub filename: Option<String>,
    pub caption: Option<String>,
}

/// Request body cap; attachments arrive base64 encoded inside the JSON.
const MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;

pub fn define_routes(state: ServerState) -> Router {
    Router::new()
        .route("/send_message", post(send_message))
        .route("/send_image", post(send_image))
        .route("/send_file", post(send_file))
        .route("/events", post(receive_event))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BYTES))
        .with_state(state)
}

/// POST send a text to a user or chat through the platform
async fn send_message(
    State(state): State<ServerState>,
    Json(params): Json<SendMessageParams>,
) -> impl IntoResponse {
    let (Some(user), Some(text)) = (
        params.user.filter(|user| !user.is_empty()),
        params.text.filter(|text| !text.is_empty()),
    ) else {
        return rejected("Both user and text parameters are required");
    };

    delivered(&user, "Message", state.transport.send_text(&user, &text).await)
}

fn rejected(reason: impl Into<String>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": reason.into() })),
    )
}

fn delivered(user: &str, what: &str, result: Result<(), Error>) -> (StatusCode, Json<Value>) {
    match result {
        Ok(()) => {
            info!("{what} sent to {user}");
            (StatusCode::OK, Json(json!({ "success": true })))
        }
        Err(e) => {
            error!("Error sending {what} to {user}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
        }
    }
}

/// POST send an image, given as a data URI, to a user or chat
async fn send_image(
    State(state): State<ServerState>,
    Json(params): Json<SendImageParams>,
) -> impl IntoResponse {
    let (Some(user), Some(image)) = (
        params.user.filter(|user| !user.is_empty()),
        params.image.filter(|image| !image.is_empty()),
    ) else {
        return rejected("Both user and image parameters are required");
    };

    let image = match Attachment::from_data_uri(&image) {
        Ok(image) => image.with_caption(params.caption),
        Err(e) => return rejected(e.to_string()),
    };

    delivered(&user, "Image", state.transport.send_image(&user, &image).await)
}

/// POST send a document, given as a data URI, to a user or chat
async fn send_file(
    State(state): State<ServerState>,
    Json(params): Json<SendFileParams>,
) -> impl IntoResponse {
    let (Some(user), Some(file)) = (
        params.user.filter(|user| !user.is_empty()),
        params.file.filter(|file| !file.is_empty()),
    ) else {
        return rejected("Both user and file parameters are required");
    };

    let file = match Attachment::from_data_uri(&file) {
        Ok(file) => file
            .with_filename(params.filename)
            .with_caption(params.caption),
        Err(e) => return rejected(e.to_string()),
    };

    delivered(&user, "File", state.transport.send_file(&user, &file).await)
}

/// POST an event from the platform client
async fn receive_event(
    State(state): State<ServerState>,
    Json(event): Json<BridgeEvent>,
) -> impl IntoResponse {
    match state.events.send(event).await {
        Ok(()) => (StatusCode::ACCEPTED, Json(json!({ "success": true }))),
        Err(_) => {
            warn!("Dropping platform event, forwarder has stopped");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "success": false, "error": "Bridge is shutting down" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header::CONTENT_TYPE, Request};
    use axum::response::Response;
    use std::sync::Mutex;
    use tower::ServiceExt;

    #[derive(Default)]
    struct StubTransport {
        fail: bool,
        attachments: Mutex<Vec<(String, Attachment)>>,
    }

    impl StubTransport {
        fn deliver(&self, chat_id: &str) -> Result<(), Error> {
            if self.fail {
                Err(Error::transport(format!("No chat {chat_id}")))
            } else {
                Ok(())
            }
        }

        fn record(&self, chat_id: &str, attachment: &Attachment) -> Result<(), Error> {
            self.deliver(chat_id)?;
            self.attachments
                .lock()
                .unwrap()
                .push((chat_id.to_string(), attachment.clone()));
            Ok(())
        }
    }

    #[async_trait]
    impl ChatTransport for StubTransport {
        async fn send_text(&self, chat_id: &str, _text: &str) -> Result<(), Error> {
            self.deliver(chat_id)
        }

        async fn send_image(&self, chat_id: &str, image: &Attachment) -> Result<(), Error> {
            self.record(chat_id, image)
        }

        async fn send_file(&self, chat_id: &str, file: &Attachment) -> Result<(), Error> {
            self.record(chat_id, file)
        }
    }

    fn app_with(transport: Arc<StubTransport>) -> (Router, mpsc::Receiver<BridgeEvent>) {
        let (tx, rx) = mpsc::channel(4);
        let state = ServerState::new(transport, tx);
        (define_routes(state), rx)
    }

    fn app(fail: bool) -> (Router, mpsc::Receiver<BridgeEvent>) {
        app_with(Arc::new(StubTransport {
            fail,
            ..Default::default()
        }))
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_send_message_requires_user_and_text() {
        let (app, _rx) = app(false);

        let response = app
            .oneshot(post_json("/send_message", json!({ "user": "79990001122@c.us" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "Both user and text parameters are required" })
        );
    }

    #[tokio::test]
    async fn test_send_message_success() {
        let (app, _rx) = app(false);

        let response = app
            .oneshot(post_json(
                "/send_message",
                json!({ "user": "79990001122@c.us", "text": "Report is ready" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true }));
    }

    #[tokio::test]
    async fn test_send_message_transport_failure() {
        let (app, _rx) = app(true);

        let response = app
            .oneshot(post_json(
                "/send_message",
                json!({ "user": "nobody", "text": "hi" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "No chat nobody" })
        );
    }

    #[tokio::test]
    async fn test_send_file_passes_decoded_attachment_to_transport() {
        let transport = Arc::new(StubTransport::default());
        let (app, _rx) = app_with(transport.clone());

        let response = app
            .oneshot(post_json(
                "/send_file",
                json!({
                    "user": "-100200300",
                    "file": "data:application/pdf;base64,JVBERi0xLjQK",
                    "filename": "weekly.pdf",
                    "caption": "Weekly field report",
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "success": true }));

        let sent = transport.attachments.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        let (chat_id, file) = &sent[0];
        assert_eq!(chat_id, "-100200300");
        assert_eq!(file.mimetype, "application/pdf");
        assert_eq!(file.data, "JVBERi0xLjQK");
        assert_eq!(file.filename.as_deref(), Some("weekly.pdf"));
        assert_eq!(file.caption.as_deref(), Some("Weekly field report"));
    }

    #[tokio::test]
    async fn test_send_file_requires_user_and_file() {
        let (app, _rx) = app(false);

        let response = app
            .oneshot(post_json("/send_file", json!({ "user": "-100200300" })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "Both user and file parameters are required" })
        );
    }

    #[tokio::test]
    async fn test_send_image_requires_user_and_image() {
        let (app, _rx) = app(false);

        let response = app
            .oneshot(post_json(
                "/send_image",
                json!({ "image": "data:image/png;base64,iVBORw0KGgo=" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "Both user and image parameters are required" })
        );
    }

    #[tokio::test]
    async fn test_send_image_rejects_payload_that_is_not_a_data_uri() {
        let transport = Arc::new(StubTransport::default());
        let (app, _rx) = app_with(transport.clone());

        let response = app
            .oneshot(post_json(
                "/send_image",
                json!({ "user": "79990001122@c.us", "image": "https://example.com/field.png" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "Invalid data URI format" })
        );
        assert!(transport.attachments.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_send_image_transport_failure() {
        let (app, _rx) = app(true);

        let response = app
            .oneshot(post_json(
                "/send_image",
                json!({ "user": "nobody", "image": "data:image/png;base64,iVBORw0KGgo=" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({ "success": false, "error": "No chat nobody" })
        );
    }

    #[tokio::test]
    async fn test_events_are_queued_for_the_forwarder() {
        let (app, mut rx) = app(false);

        let response = app
            .oneshot(post_json(
                "/events",
                json!({ "type": "ready", "account_id": "79990000000@c.us" }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(
            rx.recv().await,
            Some(BridgeEvent::Ready {
                account_id: "79990000000@c.us".to_string()
            })
        );
    }
}
