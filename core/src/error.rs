use std::fmt;
use thiserror::Error;

/// Error returned by every signing operation.
#[derive(Error, Debug)]
#[error("{kind}: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Only one of access key and secret key is set, or the session token
    /// can't be sent as a header.
    CredentialInvalid,

    /// The request misses an authority or carries values that can't be
    /// canonicalized.
    RequestInvalid,

    /// The signer can't be built from the given config, a V4 signer without
    /// region for example.
    ConfigInvalid,

    /// Anything else.
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Convenience constructors
impl Error {
    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::CredentialInvalid => f.write_str("invalid credential"),
            ErrorKind::RequestInvalid => f.write_str("invalid request"),
            ErrorKind::ConfigInvalid => f.write_str("invalid config"),
            ErrorKind::Unexpected => f.write_str("unexpected"),
        }
    }
}

/// Result that carries [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl From<fmt::Error> for Error {
    fn from(err: fmt::Error) -> Self {
        Self::unexpected("failed to format signing material").with_source(err)
    }
}

/// Errors raised while reading or rebuilding the request all mean the request
/// itself can't be signed.
macro_rules! request_invalid_from {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Self::request_invalid(err.to_string()).with_source(err)
                }
            }
        )+
    };
}

request_invalid_from!(
    std::str::Utf8Error,
    http::Error,
    http::header::InvalidHeaderValue,
    http::uri::InvalidUri,
    http::uri::InvalidUriParts,
);
