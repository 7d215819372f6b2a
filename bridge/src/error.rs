//! Error types for the `bridge` crate.
//!
//! Follows the same pattern as `domain::error`: a root struct holding the
//! kind plus the optional underlying error.
use std::error::Error as StdError;
use std::fmt;

#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    /// Talking to the data service, the ingest endpoint or the platform client failed.
    Network,
    /// The platform client refused or could not deliver an outgoing message.
    Transport(String),
    /// The bridge's own HTTP listener failed.
    Server,
    /// A request to the bridge carried an unusable value.
    Invalid(String),
}

impl Error {
    pub fn transport(reason: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Transport(reason.into()),
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Error {
            source: None,
            error_kind: ErrorKind::Invalid(reason.into()),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (&self.error_kind, &self.source) {
            (ErrorKind::Transport(reason) | ErrorKind::Invalid(reason), _) => {
                write!(f, "{reason}")
            }
            (kind, Some(source)) => write!(f, "{kind:?}: {source}"),
            (kind, None) => write!(f, "{kind:?}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Network,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Server,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_displays_reason_only() {
        assert_eq!(
            Error::transport("chat not found").to_string(),
            "chat not found"
        );
    }

    #[test]
    fn test_io_error_maps_to_server() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken").into();

        assert_eq!(err.error_kind, ErrorKind::Server);
        assert_eq!(err.to_string(), "Server: port taken");
    }
}
