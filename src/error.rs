//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

/// Errors raised by the stages of the doodle pipeline.
#[derive(Debug)]
pub enum DoodleError {
    /// The payload has no `<header>,<body>` separator or the body isn't base64
    MalformedInput(String),
    /// The decoded bytes aren't an image we can read
    UnsupportedImageFormat(String),
    /// The image model failed or returned the wrong number of images
    GenerationFailed(String),
    /// Filesystem trouble outside of artifact writes
    Io(std::io::Error),
    /// Bad startup configuration
    Config(String),
}

impl std::fmt::Display for DoodleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedInput(msg) => write!(f, "Malformed image payload: {msg}"),
            Self::UnsupportedImageFormat(msg) => write!(f, "Unsupported image format: {msg}"),
            Self::GenerationFailed(msg) => write!(f, "Failed to generate image: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
            Self::Config(msg) => write!(f, "Configuration error: {msg}"),
        }
    }
}

impl std::error::Error for DoodleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DoodleError {
    fn from(err: std::io::Error) -> Self {
        DoodleError::Io(err)
    }
}

impl From<url::ParseError> for DoodleError {
    fn from(err: url::ParseError) -> Self {
        DoodleError::Config(err.to_string())
    }
}

/// Recognition went wrong and the default label was used instead.
///
/// Never leaves the recognizer as an `Err`; it rides along in
/// [`crate::recognizer::Recognition`] so callers can tell a fallback apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionDegraded(pub String);

impl std::fmt::Display for RecognitionDegraded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Recognition degraded: {}", self.0)
    }
}

impl std::error::Error for RecognitionDegraded {}

/// A request aborted by a fatal stage failure.
#[derive(Debug)]
pub struct RequestFailed(pub DoodleError);

impl RequestFailed {
    /// The message reported to the caller.
    pub fn detail(&self) -> String {
        format!("Error generating art: {}", self.0)
    }
}

impl std::fmt::Display for RequestFailed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail())
    }
}

impl std::error::Error for RequestFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

impl From<DoodleError> for RequestFailed {
    fn from(err: DoodleError) -> Self {
        RequestFailed(err)
    }
}

impl IntoResponse for RequestFailed {
    fn into_response(self) -> axum::response::Response {
        let detail = self.detail();
        error!("Request failed: {}", detail);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "detail": detail })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_failed_wraps_stage_message() {
        let failed = RequestFailed::from(DoodleError::GenerationFailed(
            "No images generated".to_string(),
        ));
        assert_eq!(
            failed.detail(),
            "Error generating art: Failed to generate image: No images generated"
        );
    }

    #[test]
    fn request_failed_is_a_server_error() {
        let response =
            RequestFailed(DoodleError::MalformedInput("missing separator".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
