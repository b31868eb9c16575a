//! CLI command implementations.

pub mod restore;
pub mod serve;
