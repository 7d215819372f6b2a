use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use domain::error::{DomainErrorKind, EntityErrorKind, Error as DomainError, InternalErrorKind};

use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error(DomainError);

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

const INTERNAL_SERVER_ERROR: &str = "Internal server error";

// Every failure reaches the client as `{"error": reason}`.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, reason) = match &self.0.error_kind {
            DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)) => {
                match entity_error_kind {
                    EntityErrorKind::NotFound(reason) => (StatusCode::NOT_FOUND, reason.clone()),
                    EntityErrorKind::Invalid(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
                    EntityErrorKind::Conflict(reason) => (StatusCode::CONFLICT, reason.clone()),
                    EntityErrorKind::Unauthenticated(reason) => {
                        (StatusCode::UNAUTHORIZED, reason.clone())
                    }
                    EntityErrorKind::DbTransaction | EntityErrorKind::Other(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        INTERNAL_SERVER_ERROR.to_string(),
                    ),
                }
            }
            DomainErrorKind::Internal(InternalErrorKind::Other(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR.to_string(),
            ),
        };

        if status.is_server_error() {
            error!("Request failed: {:?}", self.0);
        } else {
            debug!("Request rejected with {status}: {reason}");
        }

        (status, Json(json!({ "error": reason }))).into_response()
    }
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
