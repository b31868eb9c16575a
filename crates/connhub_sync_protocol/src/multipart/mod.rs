//! Streaming scanners for single-file `multipart/form-data` uploads.
//!
//! An upload body is read in two phases:
//!
//! 1. [`HeaderScanner`] accumulates the part header block up to and including
//!    the first `CR LF CR LF`. [`extract_filename`] then pulls the logical
//!    file name out of it.
//! 2. [`BoundaryScanner`] passes payload bytes through a ring buffer exactly
//!    as long as the delimiter (`CR LF "--" boundary`), releasing a byte only
//!    once it can no longer be the start of a delimiter. Memory use is bounded
//!    by the delimiter length regardless of payload size.
//!
//! Both scanners are fed arbitrary chunks and report how much of the chunk
//! they consumed, so the caller can hand the remainder to the next phase.

mod boundary;
mod header;

pub use boundary::BoundaryScanner;
pub use header::{boundary_from_content_type, delimiter_for, extract_filename, HeaderScanner};
