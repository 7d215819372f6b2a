use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::{AppState, Error};
use domain::user::{self as UserApi, Credentials};
use log::*;

/// POST check a username/password pair for the dashboard login form
pub async fn login(
    State(app_state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST login: {credentials:?}");

    let user = UserApi::authenticate(&app_state.users_db(), credentials).await?;
    info!("User {} logged in", user.username);

    Ok(Json(json!({
        "id": user.id,
        "name": user.name,
        "username": user.username,
        "role": user.role,
    })))
}
