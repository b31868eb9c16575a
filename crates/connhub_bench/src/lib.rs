//! Benchmark utilities.

use rand::Rng;

/// Generate random payload bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Encode a single-file upload body around `payload`.
pub fn upload_body(boundary: &str, name: &str, payload: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Generate `count` distinct file names.
pub fn file_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("IMG_{i:05}.jpg")).collect()
}
