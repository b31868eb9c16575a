//! # ConnHub Testkit
//!
//! Test utilities for ConnHub.
//!
//! This crate provides:
//! - Temporary storage roots and repository fixtures
//! - A builder for `multipart/form-data` upload bodies
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use connhub_testkit::prelude::*;
//!
//! let body = MultipartBody::new("XyZ").file("a b.txt", b"XYZ");
//! assert!(body.content_type().ends_with("boundary=XyZ"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod multipart;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::multipart::*;
}

pub use fixtures::*;
pub use generators::*;
pub use multipart::*;
