use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::{AppState, Error};
use domain::message::{self as MessageApi, NewMessage};
use log::*;

/// POST a message from a messenger bridge. Creates it, or replaces the stored
/// message with the same `message_id`.
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<NewMessage>,
) -> Result<impl IntoResponse, Error> {
    debug!(
        "POST new message {:?} from {:?}",
        params.message_id, params.source_name
    );

    let outcome = MessageApi::ingest(
        &app_state.db(),
        app_state.event_publisher.as_ref(),
        params,
    )
    .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "message_id": outcome.message_id,
            "operation": outcome.operation.as_str(),
        })),
    ))
}

/// GET all messages of a chat, oldest first
pub async fn index(
    State(app_state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET messages for chat {chat_id}");

    let messages = MessageApi::find_by_chat_id(&app_state.db(), &chat_id).await?;

    Ok(Json(messages))
}
