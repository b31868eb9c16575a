//! # ConnHub Storage
//!
//! Flat file repository for uploaded files.
//!
//! Clients name files with arbitrary strings. On disk every file lives
//! directly under one storage root, named by the lowercase hex encoding of the
//! logical name's UTF-8 bytes. The mapping is deterministic, so re-uploading a
//! name overwrites the same object, and injective, so distinct names never
//! collide. Hex output contains no `/`, `\` or `.`, so no logical name can
//! escape the root.
//!
//! ## Example
//!
//! ```rust
//! use connhub_storage::{logical_name, physical_name};
//!
//! assert_eq!(physical_name("a b"), "612062");
//! assert_eq!(logical_name("612062").as_deref(), Some("a b"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod error;
mod names;
mod repository;
mod restore;

pub use error::{StorageError, StorageResult};
pub use names::{logical_name, physical_name};
pub use repository::{FileRepository, PendingObject, ResetFailure, ResetReport, StoredFile};
pub use restore::{restore_names, RestoreOutcome};
