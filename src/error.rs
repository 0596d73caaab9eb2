//! Error types for the memorial backend

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while serving a request
#[derive(Error, Debug)]
pub enum Error {
    /// A required request field is missing or malformed
    #[error("{0}")]
    Validation(String),

    /// Invalid or missing configuration (e.g. pinning credentials)
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Network error talking to a collaborator
    #[error("Network error: {0}")]
    Network(String),

    /// The pinning service rejected or failed an upload
    #[error("Pinning failed: {0}")]
    Pinning(String),

    /// Failed to compose or encode the output image
    #[error("Rendering failed: {0}")]
    Render(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// HTTP status code this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message returned to the caller. Collaborator details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Validation(msg) => msg.clone(),
            Error::Config(_) => "pinning service is not configured".to_string(),
            Error::Network(_) | Error::Pinning(_) => "pinning service request failed".to_string(),
            Error::Render(_) => "failed to render memorial image".to_string(),
            Error::Other(_) => "internal server error".to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Render(err.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_bad_request() {
        let err = Error::Validation("fname is required".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "fname is required");
    }

    #[test]
    fn collaborator_errors_hide_raw_message() {
        let err = Error::Pinning("401 Unauthorized: invalid key abc123".into());
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.public_message().contains("abc123"));
        assert!(err.to_string().contains("abc123"));
    }
}
