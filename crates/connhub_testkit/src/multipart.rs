//! `multipart/form-data` upload bodies.

/// Builds an upload body the way browsers send a single file input.
///
/// ```rust
/// use connhub_testkit::MultipartBody;
///
/// let body = MultipartBody::new("b").file("x", b"1");
/// assert_eq!(
///     body.to_bytes(),
///     b"--b\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x\"\r\n\
///       Content-Type: application/octet-stream\r\n\r\n1\r\n--b--\r\n".to_vec()
/// );
/// ```
#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    header: String,
    payload: Vec<u8>,
    closed: bool,
}

impl MultipartBody {
    /// Starts a body delimited by `boundary`.
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            header: String::new(),
            payload: Vec::new(),
            closed: true,
        }
    }

    /// Sets the file part.
    pub fn file(mut self, name: &str, payload: impl AsRef<[u8]>) -> Self {
        self.header = format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
             Content-Type: application/octet-stream\r\n"
        );
        self.payload = payload.as_ref().to_vec();
        self
    }

    /// Sets a part with hand-written header lines, each ending in CRLF.
    pub fn raw_part(mut self, header: &str, payload: impl AsRef<[u8]>) -> Self {
        self.header = header.to_string();
        self.payload = payload.as_ref().to_vec();
        self
    }

    /// Omits the closing delimiter, producing a truncated upload.
    pub fn truncated(mut self) -> Self {
        self.closed = false;
        self
    }

    /// Returns the boundary token.
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Returns the `Content-Type` header value announcing the boundary.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Returns the encoded body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + self.header.len() + 64);
        out.extend_from_slice(format!("--{}\r\n", self.boundary).as_bytes());
        out.extend_from_slice(self.header.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.payload);
        if self.closed {
            out.extend_from_slice(format!("\r\n--{}--\r\n", self.boundary).as_bytes());
        }
        out
    }

    /// Returns the encoded body split into chunks of at most `size` bytes.
    pub fn chunks(&self, size: usize) -> Vec<Vec<u8>> {
        self.to_bytes()
            .chunks(size.max(1))
            .map(|chunk| chunk.to_vec())
            .collect()
    }
}
