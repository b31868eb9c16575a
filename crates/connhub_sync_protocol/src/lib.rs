//! # ConnHub Sync Protocol
//!
//! Sync protocol types and multipart scanners for ConnHub.
//!
//! This crate provides:
//! - [`Version`] stamps for the two shared resources (text and file list)
//! - Wire types for the `state` and `text` endpoints
//! - The route table and a closed [`Method`] enumeration
//! - Streaming scanners for `multipart/form-data` upload bodies
//!
//! This is a pure protocol crate with no I/O operations.
//!
//! # Polling
//!
//! Clients poll `GET /api/state?text_ts=..&files_ts=..` with the last version
//! they saw for each resource. A resource whose version is not newer than the
//! client's is reported as `{"updated": false}`; otherwise the full current
//! value is resent together with its version. No per-client cursor is kept on
//! the server.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod messages;
pub mod multipart;
mod routes;
mod version;

pub use error::{ProtocolError, ProtocolResult};
pub use messages::{FilesState, ResourceState, StateQuery, StateResponse, TextAck, TextState};
pub use multipart::{
    boundary_from_content_type, delimiter_for, extract_filename, BoundaryScanner, HeaderScanner,
};
pub use routes::{Endpoint, Method, API_PREFIX};
pub use version::Version;
