//! Resource version stamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Last-modified stamp of a shared resource.
///
/// Versions are wall-clock milliseconds, bumped past the previous value
/// whenever the clock has not advanced, so that every mutation of a resource
/// yields a strictly greater version. On the wire a version is a plain
/// decimal integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(pub u64);

impl Version {
    /// The version a client sends before it has seen anything.
    pub const ZERO: Version = Version(0);

    /// Returns the current wall-clock time as a version.
    #[must_use]
    pub fn now() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Version(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Returns the version to assign to the next mutation after `previous`.
    ///
    /// This is the current time, or `previous + 1` if the clock has not moved
    /// past `previous`.
    #[must_use]
    pub fn next_after(previous: Version) -> Self {
        Self::now().max(Version(previous.0.saturating_add(1)))
    }

    /// Parses a version sent by a client.
    ///
    /// Absent or non-numeric input is treated as [`Version::ZERO`], which
    /// forces a full resend.
    #[must_use]
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse::<u64>().ok())
            .map(Version)
            .unwrap_or(Version::ZERO)
    }

    /// Returns true if this version is newer than what the client has seen.
    #[must_use]
    pub fn is_newer_than(self, client: Version) -> bool {
        self > client
    }

    /// Returns the raw integer value.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Version(value)
    }
}
