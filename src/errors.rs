use std::io;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Error taxonomy for the toolchain.
///
/// `PathEscape` and `NotFound` are expected client-input conditions and map
/// to specific status codes without error-level logging. Everything else is
/// surfaced to the client only as a generic 500; the detail goes to the log.
#[derive(Debug)]
pub enum DocError {
    /// Request resolved outside the served root.
    PathEscape,
    /// Resolved path does not exist.
    NotFound,
    Io(io::Error),
    Render(String),
}

impl From<io::Error> for DocError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            DocError::NotFound
        } else {
            DocError::Io(err)
        }
    }
}

impl std::fmt::Display for DocError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocError::PathEscape => write!(f, "path escapes the served root"),
            DocError::NotFound => write!(f, "not found"),
            DocError::Io(e) => write!(f, "I/O error: {}", e),
            DocError::Render(e) => write!(f, "render error: {}", e),
        }
    }
}

impl std::error::Error for DocError {}

impl IntoResponse for DocError {
    fn into_response(self) -> Response {
        match self {
            DocError::PathEscape => {
                log::debug!("rejected request path escaping the root");
                (StatusCode::FORBIDDEN, "Forbidden").into_response()
            }
            DocError::NotFound => (StatusCode::NOT_FOUND, "Not Found").into_response(),
            DocError::Io(e) => {
                log::error!("request failed with I/O error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
            DocError::Render(e) => {
                log::error!("request failed while rendering: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
