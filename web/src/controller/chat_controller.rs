use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::params::chat::IndexParams;
use crate::{AppState, Error};
use domain::chat::{self as ChatApi, ChatUpdate, NewChat};
use log::*;

/// GET all chats of one source
pub async fn index(
    State(app_state): State<AppState>,
    Query(params): Query<IndexParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET all chats for source {:?}", params.source_name);

    let chats = ChatApi::find_by_source(&app_state.db(), params.source_name.as_deref()).await?;

    Ok(Json(json!({ "chats": chats })))
}

/// POST register a chat
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<NewChat>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST register chat: {params:?}");

    let created = ChatApi::create(&app_state.db(), params).await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "chat_id": created.chat_id,
            "insertedId": created.inserted_id,
        })),
    ))
}

/// GET a chat by its messenger chat id
pub async fn read(
    State(app_state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET chat by chat_id: {chat_id}");

    let chat = ChatApi::find_by_chat_id(&app_state.db(), &chat_id).await?;

    Ok(Json(chat))
}

/// PATCH toggle a chat or attach a template/setting to it
pub async fn update(
    State(app_state): State<AppState>,
    Path(chat_id): Path<String>,
    Json(params): Json<ChatUpdate>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH chat {chat_id} with: {params:?}");

    let updated = ChatApi::update(&app_state.db(), &chat_id, params).await?;

    Ok(Json(json!({ "success": true, "updated": updated })))
}

/// DELETE a chat by its messenger chat id
pub async fn delete(
    State(app_state): State<AppState>,
    Path(chat_id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE chat {chat_id}");

    ChatApi::delete(&app_state.db(), &chat_id).await?;

    Ok(Json(json!({ "success": true, "deleted": true })))
}
