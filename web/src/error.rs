use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

#[derive(thiserror::Error, Debug)]
pub(crate) enum Error {
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    Libsample(#[from] libsample::Error),
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
    #[error("Unable to render page: {0}")]
    Template(#[from] minijinja::Error),
    #[error("Unable to reach the sample service: {0}")]
    Proxy(#[source] reqwest::Error),
    #[error("Resource Not Found: {0}")]
    NotFound(String),
}

impl Error {
    pub(crate) fn to_client_status(&self) -> (StatusCode, String) {
        match self {
            Error::Other(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Unknown error".to_string(),
            ),
            Error::Libsample(e) if e.is_not_found() => (StatusCode::NOT_FOUND, e.to_string()),
            Error::Libsample(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            Error::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session error".to_string(),
            ),
            Error::Template(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal error".to_string(),
            ),
            Error::Proxy(_) => (
                StatusCode::BAD_GATEWAY,
                libsample::error::CONNECTIVITY_MESSAGE.to_string(),
            ),
            Error::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
        }
    }
}

// Tell axum how to convert `Error` into a response.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        warn!("Got error for response: {self:?}");
        let (status, message) = self.to_client_status();
        let mut response = (status, message).into_response();
        // keep the error around for anything that wants to log it further up the stack
        response.extensions_mut().insert(Arc::new(self));
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status() {
        let err: Error = libsample::Error::from_response_body(404, "").into();
        assert_eq!(err.to_client_status().0, StatusCode::NOT_FOUND);

        let err: Error =
            libsample::Error::from_response_body(500, r#"{"message": "Disk full"}"#).into();
        assert_eq!(
            err.to_client_status(),
            (StatusCode::BAD_GATEWAY, "Disk full".to_string())
        );

        let err = Error::NotFound("/app/nowhere".into());
        assert_eq!(
            err.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
