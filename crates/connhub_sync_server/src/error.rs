//! Error types for the sync server.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use connhub_storage::StorageError;
use connhub_sync_protocol::ProtocolError;
use std::net::SocketAddr;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the sync server.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Malformed upload request.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The request body could not be read.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The request body exceeded its limit.
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },

    /// Unknown route or missing file.
    #[error("not found: {0}")]
    NotFound(String),

    /// Known route, wrong method.
    #[error("method not allowed")]
    MethodNotAllowed,

    /// The upload stream ended, failed, or stalled before its closing boundary.
    #[error("upload truncated: {0}")]
    Truncated(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The listening socket could not be bound.
    #[error("cannot bind {addr}: {source}")]
    Bind {
        /// The requested address.
        addr: SocketAddr,
        /// The underlying error.
        source: std::io::Error,
    },

    /// `start` was called on a running server.
    #[error("server is already running")]
    AlreadyRunning,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        self.status_code().is_client_error()
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns the HTTP status reported for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Protocol(_) | ServerError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::NotFound(_) => StatusCode::NOT_FOUND,
            ServerError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ServerError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServerError::Storage(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
            ServerError::Truncated(_)
            | ServerError::Storage(StorageError::Io(_))
            | ServerError::Io(_)
            | ServerError::Bind { .. }
            | ServerError::AlreadyRunning
            | ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the plain-text body sent to the client.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::Protocol(ProtocolError::MissingBoundary) => "No boundary found".into(),
            ServerError::Protocol(ProtocolError::MissingFilename) => "Filename not found".into(),
            ServerError::Protocol(e) => format!("Bad upload: {e}"),
            ServerError::InvalidBody(_) => "Error reading body".into(),
            ServerError::PayloadTooLarge { limit } => format!("Body exceeds {limit} bytes"),
            ServerError::NotFound(_) | ServerError::Storage(StorageError::NotFound(_)) => {
                "File not found".into()
            }
            ServerError::Storage(StorageError::InvalidName(_)) => "Invalid file name".into(),
            ServerError::MethodNotAllowed => "Invalid method".into(),
            ServerError::Truncated(_) | ServerError::Storage(_) | ServerError::Io(_) => {
                "Error saving file".into()
            }
            ServerError::Bind { .. } | ServerError::AlreadyRunning | ServerError::Internal(_) => {
                "Server error".into()
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            [(header::CONTENT_TYPE, crate::handler::TEXT_PLAIN)],
            self.public_message(),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classification() {
        assert!(ServerError::Protocol(ProtocolError::MissingBoundary).is_client_error());
        assert!(ServerError::NotFound("x".into()).is_client_error());
        assert!(ServerError::Truncated("eof".into()).is_server_error());
        assert!(!ServerError::InvalidBody("bad".into()).is_server_error());
        assert!(ServerError::Storage(StorageError::NotFound("x".into())).is_client_error());
    }

    #[test]
    fn status_codes() {
        assert_eq!(
            ServerError::Protocol(ProtocolError::MissingFilename).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServerError::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ServerError::PayloadTooLarge { limit: 1 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(
            ServerError::Storage(StorageError::Io(io)).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn public_messages() {
        assert_eq!(
            ServerError::Protocol(ProtocolError::MissingBoundary).public_message(),
            "No boundary found"
        );
        assert_eq!(
            ServerError::Truncated("eof".into()).public_message(),
            "Error saving file"
        );
    }
}
