//! Error types for Trellis.
//!
//! Handlers return [`TrellisResult`]. An [`Error::Http`] carries the status
//! the client should see; anything else is an [`Error::Internal`] and maps
//! to `500 Internal Server Error`.

use http::StatusCode;
use std::fmt;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type TrellisResult<T> = Result<T, Error>;

/// An error with an explicit HTTP status.
///
/// # Example
///
/// ```
/// use trellis_core::HttpError;
/// use http::StatusCode;
///
/// let err = HttpError::new(StatusCode::NOT_FOUND);
/// assert_eq!(err.status(), StatusCode::NOT_FOUND);
/// assert_eq!(err.message(), "Not Found");
///
/// let err = HttpError::with_message(StatusCode::BAD_REQUEST, "missing id");
/// assert_eq!(err.to_string(), "missing id");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Creates an error whose message is the status's reason phrase.
    #[must_use]
    pub fn new(status: StatusCode) -> Self {
        let message = status
            .canonical_reason()
            .map_or_else(|| status.as_str().to_string(), ToString::to_string);
        Self { status, message }
    }

    /// Creates an error with a custom message.
    #[must_use]
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// `404 Not Found`.
    #[must_use]
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// `405 Method Not Allowed`.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// `400 Bad Request` with a message.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::BAD_REQUEST, message)
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Standard error type returned by handlers.
#[derive(Error, Debug)]
pub enum Error {
    /// An error carrying its own status.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Anything else.
    #[error("Internal error: {message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl Error {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Shorthand for `Error::Http(HttpError::new(status))`.
    #[must_use]
    pub fn status(status: StatusCode) -> Self {
        Self::Http(HttpError::new(status))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Http(err) => err.status(),
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the structured HTTP error, if this is one.
    #[must_use]
    pub const fn as_http(&self) -> Option<&HttpError> {
        match self {
            Self::Http(err) => Some(err),
            Self::Internal { .. } => None,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(source: anyhow::Error) -> Self {
        Self::Internal {
            message: source.to_string(),
            source: Some(source),
        }
    }
}
