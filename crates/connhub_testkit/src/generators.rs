//! Property-based test generators using proptest.

use proptest::prelude::*;

/// Strategy for logical file names as browsers send them.
///
/// Any non-empty text without `"` or control characters, including spaces,
/// path separators and non-ASCII letters.
pub fn filename_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[^\"\\x00-\\x1f\\x7f]{1,24}").expect("Invalid regex")
}

/// Strategy for multipart boundary tokens.
pub fn boundary_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[A-Za-z0-9'()+_,.-]{1,70}").expect("Invalid regex")
}

/// Strategy for upload payloads: arbitrary bytes, biased towards CR and LF.
pub fn payload_strategy() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(
        prop_oneof![
            3 => any::<u8>(),
            1 => Just(b'\r'),
            1 => Just(b'\n'),
            1 => Just(b'-'),
        ],
        0..2048,
    )
}

/// Strategy for read sizes when splitting a body into chunks.
pub fn chunk_size_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![1usize..8, 8usize..512, 512usize..8192]
}
