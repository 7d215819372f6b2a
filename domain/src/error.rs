//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. `web` depends on `domain` but not on `entity_api`, so every
/// lower-layer error is translated here. Kinds that reach a client carry the
/// human-readable reason the client is shown.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Other(String),
}

/// Entity-level failures, reduced to what the `web` layer needs to pick a status code.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound(String),
    Invalid(String),
    Conflict(String),
    Unauthenticated(String),
    DbTransaction,
    Other(String),
}

impl Error {
    fn entity(kind: EntityErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(kind)),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::entity(EntityErrorKind::NotFound(reason.into()))
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::entity(EntityErrorKind::Invalid(reason.into()))
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::entity(EntityErrorKind::Conflict(reason.into()))
    }

    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::entity(EntityErrorKind::Unauthenticated(reason.into()))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::InvalidQueryTerm => {
                EntityErrorKind::Invalid("Invalid id format".to_string())
            }
            EntityApiErrorKind::RecordAlreadyExists => {
                EntityErrorKind::Conflict("Record already exists".to_string())
            }
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
            EntityApiErrorKind::Other => EntityErrorKind::Other("EntityErrorKind".to_string()),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(err: bcrypt::BcryptError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Password hashing related error".to_string(),
            )),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(err: tokio::task::JoinError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                "Blocking task failed".to_string(),
            )),
        }
    }
}

impl From<mongodb::bson::ser::Error> for Error {
    fn from(err: mongodb::bson::ser::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::Invalid("Payload cannot be stored".to_string()),
            )),
        }
    }
}
