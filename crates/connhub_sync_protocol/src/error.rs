//! Error types for protocol parsing.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while interpreting protocol input.
///
/// All of these describe a malformed client request; none of them is caused
/// by server-side state.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The `Content-Type` header is absent or has no `boundary` parameter.
    #[error("no boundary found")]
    MissingBoundary,

    /// The part header block has no `filename="..."` attribute.
    #[error("filename not found")]
    MissingFilename,

    /// The part header names an empty file.
    #[error("filename is empty")]
    EmptyFilename,

    /// The part header block grew past the configured limit.
    #[error("part header exceeds {limit} bytes")]
    HeaderTooLarge {
        /// The configured limit in bytes.
        limit: usize,
    },
}
