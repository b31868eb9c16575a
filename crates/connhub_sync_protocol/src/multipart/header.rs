//! Part header parsing.

use crate::error::{ProtocolError, ProtocolResult};

const BOUNDARY_KEY: &str = "boundary=";
const FILENAME_KEY: &str = "filename=\"";

/// Progress through the `CR LF CR LF` terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    None,
    Cr,
    CrLf,
    CrLfCr,
}

/// Accumulates a part header block up to its blank-line terminator.
///
/// A byte that does not continue the terminator sequence resets the scan,
/// including a second `CR` after a lone `CR`.
#[derive(Debug)]
pub struct HeaderScanner {
    state: Terminator,
    block: Vec<u8>,
    limit: usize,
    complete: bool,
}

impl HeaderScanner {
    /// Creates a scanner that rejects header blocks longer than `limit` bytes.
    pub fn new(limit: usize) -> Self {
        Self {
            state: Terminator::None,
            block: Vec::new(),
            limit,
            complete: false,
        }
    }

    /// Feeds the next chunk of the body.
    ///
    /// Returns `Some(consumed)` once the terminator has been seen, where
    /// `consumed` counts the bytes of `chunk` that belong to the header
    /// block; the rest of the chunk is payload. Returns `None` if the whole
    /// chunk was absorbed and the terminator is still pending.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::HeaderTooLarge`] if the block exceeds the
    /// limit before the terminator is found.
    pub fn feed(&mut self, chunk: &[u8]) -> ProtocolResult<Option<usize>> {
        if self.complete {
            return Ok(Some(0));
        }
        for (i, &byte) in chunk.iter().enumerate() {
            if self.block.len() >= self.limit {
                return Err(ProtocolError::HeaderTooLarge { limit: self.limit });
            }
            self.block.push(byte);
            self.state = match (self.state, byte) {
                (Terminator::None, b'\r') => Terminator::Cr,
                (Terminator::Cr, b'\n') => Terminator::CrLf,
                (Terminator::CrLf, b'\r') => Terminator::CrLfCr,
                (Terminator::CrLfCr, b'\n') => {
                    self.complete = true;
                    return Ok(Some(i + 1));
                }
                _ => Terminator::None,
            };
        }
        Ok(None)
    }

    /// Returns true once the terminator has been seen.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns the bytes accumulated so far, terminator included.
    pub fn block(&self) -> &[u8] {
        &self.block
    }

    /// Decodes the accumulated block as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.block).into_owned()
    }
}

/// Extracts the `filename` attribute from a part header block.
///
/// The value is everything between `filename="` and the next `"`, taken from
/// the first occurrence. Quote characters inside a name therefore truncate it.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingFilename`] if the attribute is absent or
/// unterminated, and [`ProtocolError::EmptyFilename`] for `filename=""`.
pub fn extract_filename(header: &str) -> ProtocolResult<String> {
    let start = header
        .find(FILENAME_KEY)
        .map(|i| i + FILENAME_KEY.len())
        .ok_or(ProtocolError::MissingFilename)?;
    let len = header[start..]
        .find('"')
        .ok_or(ProtocolError::MissingFilename)?;
    if len == 0 {
        return Err(ProtocolError::EmptyFilename);
    }
    Ok(header[start..start + len].to_string())
}

/// Extracts the `boundary` parameter from a `Content-Type` header value.
///
/// The token ends at the next `;` or whitespace; one pair of surrounding
/// double quotes is removed.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingBoundary`] if the header is absent, has no
/// `boundary=` parameter, or the parameter is empty.
pub fn boundary_from_content_type(content_type: Option<&str>) -> ProtocolResult<String> {
    let content_type = content_type.ok_or(ProtocolError::MissingBoundary)?;
    let start = content_type
        .find(BOUNDARY_KEY)
        .map(|i| i + BOUNDARY_KEY.len())
        .ok_or(ProtocolError::MissingBoundary)?;
    let rest = &content_type[start..];
    let token = if let Some(quoted) = rest.strip_prefix('"') {
        quoted.split('"').next().unwrap_or_default()
    } else {
        rest.split(|c: char| c == ';' || c.is_whitespace())
            .next()
            .unwrap_or_default()
    };
    if token.is_empty() {
        return Err(ProtocolError::MissingBoundary);
    }
    Ok(token.to_string())
}

/// Returns the on-the-wire delimiter that ends a part's payload.
pub fn delimiter_for(boundary: &str) -> Vec<u8> {
    let mut delimiter = Vec::with_capacity(boundary.len() + 4);
    delimiter.extend_from_slice(b"\r\n--");
    delimiter.extend_from_slice(boundary.as_bytes());
    delimiter
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[u8] = b"------XyZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a b.txt\"\r\nContent-Type: text/plain\r\n\r\n";

    #[test]
    fn header_complete_in_one_chunk() {
        let mut body = HEADER.to_vec();
        body.extend_from_slice(b"payload");

        let mut scanner = HeaderScanner::new(1024);
        let consumed = scanner.feed(&body).unwrap();
        assert_eq!(consumed, Some(HEADER.len()));
        assert!(scanner.is_complete());
        assert_eq!(scanner.block(), HEADER);
    }

    #[test]
    fn header_split_across_chunks() {
        let mut scanner = HeaderScanner::new(1024);
        for chunk in HEADER[..HEADER.len() - 1].chunks(3) {
            assert_eq!(scanner.feed(chunk).unwrap(), None);
        }
        assert_eq!(scanner.feed(b"\nrest").unwrap(), Some(1));
        assert_eq!(scanner.text(), String::from_utf8_lossy(HEADER));
    }

    #[test]
    fn double_cr_resets_scan() {
        let mut scanner = HeaderScanner::new(1024);
        assert_eq!(scanner.feed(b"x\r\r\n\r\n").unwrap(), None);
        assert_eq!(scanner.feed(b"\r\n").unwrap(), Some(2));
    }

    #[test]
    fn header_limit() {
        let mut scanner = HeaderScanner::new(8);
        let err = scanner.feed(b"0123456789").unwrap_err();
        assert_eq!(err, ProtocolError::HeaderTooLarge { limit: 8 });
    }

    #[test]
    fn header_exactly_at_limit() {
        let mut scanner = HeaderScanner::new(4);
        assert_eq!(scanner.feed(b"\r\n\r\n").unwrap(), Some(4));
    }

    #[test]
    fn filename_extraction() {
        let header = String::from_utf8_lossy(HEADER);
        assert_eq!(extract_filename(&header).unwrap(), "a b.txt");
    }

    #[test]
    fn filename_non_ascii() {
        let header = "Content-Disposition: form-data; name=\"file\"; filename=\"사진 1.jpg\"\r\n\r\n";
        assert_eq!(extract_filename(header).unwrap(), "사진 1.jpg");
    }

    #[test]
    fn filename_takes_first_closing_quote() {
        let header = "Content-Disposition: form-data; filename=\"say \"hi\".txt\"\r\n\r\n";
        assert_eq!(extract_filename(header).unwrap(), "say ");
    }

    #[test]
    fn filename_missing_or_empty() {
        assert_eq!(
            extract_filename("Content-Disposition: form-data; name=\"file\"\r\n\r\n"),
            Err(ProtocolError::MissingFilename)
        );
        assert_eq!(
            extract_filename("Content-Disposition: form-data; filename=\"oops"),
            Err(ProtocolError::MissingFilename)
        );
        assert_eq!(
            extract_filename("Content-Disposition: form-data; filename=\"\"\r\n\r\n"),
            Err(ProtocolError::EmptyFilename)
        );
    }

    #[test]
    fn boundary_parameter() {
        assert_eq!(
            boundary_from_content_type(Some(
                "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxk"
            ))
            .unwrap(),
            "----WebKitFormBoundary7MA4YWxk"
        );
        assert_eq!(
            boundary_from_content_type(Some("multipart/form-data; boundary=\"a b\"; charset=utf-8"))
                .unwrap(),
            "a b"
        );
        assert_eq!(
            boundary_from_content_type(Some("multipart/form-data; boundary=abc; charset=utf-8"))
                .unwrap(),
            "abc"
        );
    }

    #[test]
    fn boundary_missing() {
        assert_eq!(
            boundary_from_content_type(None),
            Err(ProtocolError::MissingBoundary)
        );
        assert_eq!(
            boundary_from_content_type(Some("multipart/form-data")),
            Err(ProtocolError::MissingBoundary)
        );
        assert_eq!(
            boundary_from_content_type(Some("multipart/form-data; boundary=")),
            Err(ProtocolError::MissingBoundary)
        );
    }

    #[test]
    fn delimiter_layout() {
        assert_eq!(delimiter_for("xyz"), b"\r\n--xyz".to_vec());
    }
}
