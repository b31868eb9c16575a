//! Wire messages for the polling endpoints.

use crate::version::Version;
use serde::{Deserialize, Serialize};

/// Query parameters of a `state` poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StateQuery {
    /// Last text version the client has seen.
    pub text_ts: Version,
    /// Last file-list version the client has seen.
    pub files_ts: Version,
}

impl StateQuery {
    /// Creates a query for the given client versions.
    pub fn new(text_ts: Version, files_ts: Version) -> Self {
        Self { text_ts, files_ts }
    }

    /// Parses a raw query string such as `text_ts=12&files_ts=0`.
    ///
    /// Never fails: anything unparseable reads as zero.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = raw.unwrap_or_default();
        Self::from_pairs(
            raw.split('&')
                .filter(|pair| !pair.is_empty())
                .map(|pair| pair.split_once('=').unwrap_or((pair, ""))),
        )
    }

    /// Builds a query from decoded `key=value` pairs.
    ///
    /// The first occurrence of each key wins. Unknown keys are ignored and
    /// malformed values read as zero.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut text_ts = None;
        let mut files_ts = None;
        for (key, value) in pairs {
            match key {
                "text_ts" if text_ts.is_none() => text_ts = Some(value),
                "files_ts" if files_ts.is_none() => files_ts = Some(value),
                _ => {}
            }
        }
        Self {
            text_ts: Version::parse_lenient(text_ts),
            files_ts: Version::parse_lenient(files_ts),
        }
    }
}

/// Per-resource section of a `state` response.
///
/// Serializes as `{"updated": false}` when the client is current, or as
/// `{"updated": true, "data": .., "ts": ..}` with a full snapshot otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceState<T> {
    /// Whether the resource changed since the client's version.
    pub updated: bool,
    /// Full current value, present only when `updated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Current version, present only when `updated`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts: Option<Version>,
}

impl<T> ResourceState<T> {
    /// The client already has the current value.
    pub fn unchanged() -> Self {
        Self {
            updated: false,
            data: None,
            ts: None,
        }
    }

    /// The resource changed; carries the full snapshot.
    pub fn changed(data: T, ts: Version) -> Self {
        Self {
            updated: true,
            data: Some(data),
            ts: Some(ts),
        }
    }

    /// Converts the result of an `if newer` read into a response section.
    pub fn from_snapshot(snapshot: Option<(T, Version)>) -> Self {
        match snapshot {
            Some((data, ts)) => Self::changed(data, ts),
            None => Self::unchanged(),
        }
    }
}

/// Text section of a `state` response.
pub type TextState = ResourceState<String>;

/// File-list section of a `state` response.
pub type FilesState = ResourceState<Vec<String>>;

/// Body of a `state` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateResponse {
    /// Shared text blob.
    pub text: TextState,
    /// Ordered list of shared file names.
    pub files: FilesState,
}

/// Body of a successful `text` response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextAck {
    /// Version assigned to the new text.
    pub ts: Version,
}
