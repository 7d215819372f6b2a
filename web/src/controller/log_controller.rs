use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::{AppState, Error};
use domain::log_entry::{self as LogEntryApi, NewLogEntry};
use log::*;

/// GET the most recent log entries, newest first
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET recent log entries");

    let entries = LogEntryApi::find_recent(&app_state.logs_db()).await?;

    Ok(Json(entries))
}

/// POST a log entry from any service of the pipeline
pub async fn submit(
    State(app_state): State<AppState>,
    Json(params): Json<NewLogEntry>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST log entry from {:?}", params.source);

    LogEntryApi::submit(
        &app_state.logs_db(),
        app_state.event_publisher.as_ref(),
        params,
    )
    .await?;

    Ok(Json(json!({ "success": true })))
}
