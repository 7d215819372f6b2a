use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use crate::params::user::DeleteParams;
use crate::{AppState, Error};
use domain::user::{self as UserApi, NewUser, UserUpdate};
use log::*;

/// GET all dashboard accounts
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    debug!("GET all users");

    let users = UserApi::find_all(&app_state.users_db()).await?;

    Ok(Json(users))
}

/// POST create a dashboard account
pub async fn create(
    State(app_state): State<AppState>,
    Json(params): Json<NewUser>,
) -> Result<impl IntoResponse, Error> {
    debug!("POST create user {:?}", params.username);

    let user = UserApi::create(&app_state.users_db(), params).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": user.id,
            "username": user.username,
            "name": user.name,
            "role": user.role,
        })),
    ))
}

/// GET one dashboard account by id
pub async fn read(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, Error> {
    debug!("GET user {id}");

    let user = UserApi::find_by_id(&app_state.users_db(), &id).await?;

    Ok(Json(user))
}

/// PATCH a dashboard account's name and/or password
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(params): Json<UserUpdate>,
) -> Result<impl IntoResponse, Error> {
    debug!("PATCH user {id} with {params:?}");

    UserApi::update(&app_state.users_db(), &id, params).await?;

    Ok(Json(json!({ "message": "User updated successfully" })))
}

/// DELETE a dashboard account by id
pub async fn delete(
    State(app_state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, Error> {
    debug!("DELETE user {:?}", params.id);

    UserApi::delete(&app_state.users_db(), params.id.as_deref()).await?;

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
