//! Logical to on-disk name mapping.

/// Maps a logical file name to its on-disk name.
///
/// The result is the lowercase hex encoding of the name's UTF-8 bytes.
#[must_use]
pub fn physical_name(logical: &str) -> String {
    hex::encode(logical.as_bytes())
}

/// Maps an on-disk name back to its logical file name.
///
/// Returns `None` if `physical` is not hex or does not decode to UTF-8.
#[must_use]
pub fn logical_name(physical: &str) -> Option<String> {
    let bytes = hex::decode(physical).ok()?;
    String::from_utf8(bytes).ok()
}
