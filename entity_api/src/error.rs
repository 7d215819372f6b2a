//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use mongodb::bson::oid::Error as ObjectIdError;
use mongodb::error::{Error as MongoError, ErrorKind, WriteFailure};

/// Server error code MongoDB reports when a unique index rejects a write.
const DUPLICATE_KEY_CODE: i32 = 11000;

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex EntityApiErrorKind::RecordAlreadyExists
///  * Errors related to interactions with the database itself. Ex a lost connection
#[derive(Debug)]
pub struct Error {
    // Underlying error emitted from the driver or bson internals
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // A unique index already holds this key
    RecordAlreadyExists,
    // Errors related to interactions with the database itself. Ex a lost connection
    SystemError,
    // Other errors
    Other,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<MongoError> for Error {
    fn from(err: MongoError) -> Self {
        let error_kind = if is_duplicate_key(&err) {
            EntityApiErrorKind::RecordAlreadyExists
        } else {
            match err.kind.as_ref() {
                ErrorKind::BsonSerialization(_) | ErrorKind::BsonDeserialization(_) => {
                    EntityApiErrorKind::Other
                }
                _ => EntityApiErrorKind::SystemError,
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<ObjectIdError> for Error {
    fn from(err: ObjectIdError) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: EntityApiErrorKind::InvalidQueryTerm,
        }
    }
}

fn is_duplicate_key(err: &MongoError) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;
    use std::str::FromStr;

    #[test]
    fn test_invalid_object_id_maps_to_invalid_query_term() {
        let err: Error = ObjectId::from_str("not-an-object-id").unwrap_err().into();
        assert_eq!(err.error_kind, EntityApiErrorKind::InvalidQueryTerm);
        assert!(err.source.is_some());
    }
}
