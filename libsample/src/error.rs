//! Objects related to reporting errors from this library

/// Message reported when a request was sent but no response ever came back
pub const CONNECTIVITY_MESSAGE: &str = "Network error: Unable to connect to the server";

/// Message reported when the server answered with an error but no usable explanation
pub const SERVER_FALLBACK_MESSAGE: &str = "An error occurred";

/// Message reported for failures that carry no message of their own
pub const UNEXPECTED_FALLBACK_MESSAGE: &str = "An unexpected error occurred";

/// A list of error types that can occur within this library.
///
/// The [std::fmt::Display] output of every variant is the human-readable message that should be
/// shown to the user, so callers can simply use `err.to_string()`.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The server answered with a non-success status
    #[error("{message}")]
    Server { status: u16, message: String },

    /// The request was sent but no response was received
    #[error("Network error: Unable to connect to the server")]
    Connectivity(#[source] reqwest::Error),

    /// Anything else that went wrong while talking to the server
    #[error("{0}")]
    Unexpected(String),

    #[error("invalid api base url '{0}'")]
    InvalidBaseUrl(String),

    #[error("a deployed build needs a public base url to resolve the base path '{0}'")]
    MissingPublicBaseUrl(String),
}

impl Error {
    /// Normalizes an error returned by the http transport.
    ///
    /// Errors that happened before any response arrived are connectivity failures; everything
    /// else keeps its own message.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() || err.is_request() {
            Error::Connectivity(err)
        } else {
            Error::unexpected(err.to_string())
        }
    }

    /// Builds an [Error::Server] from a status code and the raw response body.
    ///
    /// A json body's `message` field wins over its `error` field. Empty strings are treated as
    /// absent.
    pub fn from_response_body(status: u16, body: &str) -> Self {
        #[derive(serde::Deserialize)]
        struct ErrorBody {
            message: Option<serde_json::Value>,
            error: Option<serde_json::Value>,
        }

        fn non_empty(val: Option<serde_json::Value>) -> Option<String> {
            match val? {
                serde_json::Value::String(s) if !s.is_empty() => Some(s),
                _ => None,
            }
        }

        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| non_empty(b.message).or_else(|| non_empty(b.error)))
            .unwrap_or_else(|| SERVER_FALLBACK_MESSAGE.to_string());
        Error::Server { status, message }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        let message = message.into();
        match message.is_empty() {
            true => Error::Unexpected(UNEXPECTED_FALLBACK_MESSAGE.to_string()),
            false => Error::Unexpected(message),
        }
    }

    /// Whether the server reported that the requested object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Server { status: 404, .. })
    }
}

/// A convenience type alias for a [Result] with [Error] as its error type
pub type Result<T, E = Error> = std::result::Result<T, E>;
