//! Ring-buffer delimiter detection.

/// Detects a fixed delimiter in a byte stream using a ring buffer.
///
/// The ring holds exactly `delimiter.len()` bytes. The first bytes pushed
/// prime it; after that every push evicts the oldest byte, which is payload
/// because the window it sat in did not match. [`is_match`](Self::is_match)
/// compares the ring, read from the head and wrapping, against the delimiter.
///
/// # Example
///
/// ```
/// use connhub_sync_protocol::BoundaryScanner;
///
/// let mut scanner = BoundaryScanner::new(b"\r\n--b".to_vec());
/// let mut payload = Vec::new();
/// let consumed = scanner.feed(b"data\r\n--b--\r\n", &mut payload);
/// assert_eq!(consumed, Some(9));
/// assert_eq!(payload, b"data");
/// ```
#[derive(Debug, Clone)]
pub struct BoundaryScanner {
    delimiter: Vec<u8>,
    ring: Vec<u8>,
    head: usize,
    filled: usize,
}

impl BoundaryScanner {
    /// Creates a scanner for `delimiter`.
    pub fn new(delimiter: Vec<u8>) -> Self {
        let ring = vec![0u8; delimiter.len()];
        Self {
            delimiter,
            ring,
            head: 0,
            filled: 0,
        }
    }

    /// Returns the delimiter this scanner looks for.
    pub fn delimiter(&self) -> &[u8] {
        &self.delimiter
    }

    /// Returns true until the ring holds a full delimiter's worth of bytes.
    pub fn is_priming(&self) -> bool {
        self.filled < self.ring.len()
    }

    /// Pushes one byte, returning the evicted payload byte if any.
    ///
    /// Nothing is evicted while the ring is still priming.
    pub fn push(&mut self, byte: u8) -> Option<u8> {
        let len = self.ring.len();
        if len == 0 {
            return Some(byte);
        }
        if self.filled < len {
            self.ring[self.filled] = byte;
            self.filled += 1;
            return None;
        }
        let evicted = self.ring[self.head];
        self.ring[self.head] = byte;
        self.head = (self.head + 1) % len;
        Some(evicted)
    }

    /// Returns true if the ring currently holds exactly the delimiter.
    pub fn is_match(&self) -> bool {
        let len = self.ring.len();
        if self.filled < len {
            return false;
        }
        self.delimiter
            .iter()
            .enumerate()
            .all(|(i, &expected)| self.ring[(self.head + i) % len] == expected)
    }

    /// Feeds a chunk, appending released payload bytes to `out`.
    ///
    /// Returns `Some(consumed)` as soon as the delimiter is matched, where
    /// `consumed` counts the bytes of `chunk` up to and including the end of
    /// the delimiter. Returns `None` if the chunk was consumed without a match.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<u8>) -> Option<usize> {
        if self.is_match() {
            return Some(0);
        }
        for (i, &byte) in chunk.iter().enumerate() {
            if let Some(evicted) = self.push(byte) {
                out.push(evicted);
            }
            if self.is_match() {
                return Some(i + 1);
            }
        }
        None
    }
}
