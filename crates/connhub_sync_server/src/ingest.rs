//! Streaming multipart upload ingestion.
//!
//! An upload body carries a single file part. The part header is scanned up
//! to its blank line, the filename is taken from it, and the payload is then
//! streamed through a [`BoundaryScanner`] straight into the repository. Only
//! the ring buffer and one write buffer are ever held in memory.

use crate::error::{ServerError, ServerResult};
use connhub_storage::FileRepository;
use connhub_sync_protocol::{delimiter_for, extract_filename, BoundaryScanner, HeaderScanner};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufWriter};
use tracing::debug;

const WRITE_BUFFER: usize = 64 * 1024;

/// A fully written upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingested {
    /// Logical file name from the part header.
    pub name: String,
    /// Payload bytes written.
    pub bytes: u64,
}

/// Streams one multipart file part from `reader` into `repository`.
///
/// The bytes are flushed and moved over any previous object for the name
/// before this returns; committing the name to the file list is left to the
/// caller. On failure the previous object is untouched and a staging file may
/// remain on disk until the next reset.
///
/// # Errors
///
/// - [`ServerError::Protocol`] for a missing or empty filename or an
///   oversized part header.
/// - [`ServerError::Truncated`] if the body ends, fails or stalls before the
///   closing delimiter.
/// - [`ServerError::Storage`] / [`ServerError::Io`] if the object cannot be
///   created or written.
pub async fn ingest_upload<R>(
    reader: &mut R,
    boundary: &str,
    repository: &FileRepository,
    max_header_bytes: usize,
) -> ServerResult<Ingested>
where
    R: AsyncBufRead + Unpin,
{
    let header = read_part_header(reader, max_header_bytes).await?;
    let name = extract_filename(&header)?;

    let object = repository.create(&name).await?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER, object);
    let mut scanner = BoundaryScanner::new(delimiter_for(boundary));
    let mut payload = Vec::with_capacity(WRITE_BUFFER);
    let mut bytes = 0u64;

    loop {
        let chunk = reader
            .fill_buf()
            .await
            .map_err(|e| ServerError::Truncated(format!("reading payload of {name}: {e}")))?;
        if chunk.is_empty() {
            return Err(ServerError::Truncated(format!(
                "body ended before closing boundary of {name}"
            )));
        }
        let matched = scanner.feed(chunk, &mut payload);
        let consumed = matched.unwrap_or(chunk.len());
        reader.consume(consumed);

        if !payload.is_empty() {
            writer.write_all(&payload).await?;
            bytes += payload.len() as u64;
            payload.clear();
        }
        if matched.is_some() {
            break;
        }
    }

    writer.flush().await?;
    writer.into_inner().commit().await?;
    debug!(name = %name, bytes, "upload written");
    Ok(Ingested { name, bytes })
}

async fn read_part_header<R>(reader: &mut R, limit: usize) -> ServerResult<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut scanner = HeaderScanner::new(limit);
    loop {
        let chunk = reader
            .fill_buf()
            .await
            .map_err(|e| ServerError::Truncated(format!("reading part header: {e}")))?;
        if chunk.is_empty() {
            return Err(ServerError::Truncated(
                "body ended inside part header".to_string(),
            ));
        }
        let available = chunk.len();
        match scanner.feed(chunk)? {
            Some(consumed) => {
                reader.consume(consumed);
                return Ok(scanner.text());
            }
            None => reader.consume(available),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connhub_sync_protocol::ProtocolError;
    use connhub_testkit::{MultipartBody, TempRoot};
    use tokio::io::{AsyncReadExt, BufReader};

    async fn stored(repo: &FileRepository, name: &str) -> Vec<u8> {
        let mut stored = repo.open(name).await.unwrap();
        let mut out = Vec::new();
        stored.file.read_to_end(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn ingests_single_part() {
        let root = TempRoot::new();
        let repo = root.repository();
        let body = MultipartBody::new("XyZ").file("notes.txt", b"line one\r\nline two");

        let bytes = body.to_bytes();
        let mut reader = BufReader::new(bytes.as_slice());
        let ingested = ingest_upload(&mut reader, "XyZ", &repo, 1024).await.unwrap();

        assert_eq!(ingested.name, "notes.txt");
        assert_eq!(ingested.bytes, 18);
        assert_eq!(stored(&repo, "notes.txt").await, b"line one\r\nline two");
    }

    #[tokio::test]
    async fn tiny_reads_produce_same_bytes() {
        let root = TempRoot::new();
        let repo = root.repository();
        let payload: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
        let body = MultipartBody::new("b0undary").file("blob.bin", &payload);

        let bytes = body.to_bytes();
        let mut reader = BufReader::with_capacity(3, bytes.as_slice());
        ingest_upload(&mut reader, "b0undary", &repo, 1024)
            .await
            .unwrap();

        assert_eq!(stored(&repo, "blob.bin").await, payload);
    }

    #[tokio::test]
    async fn boundary_prefix_inside_payload_is_kept() {
        let root = TempRoot::new();
        let repo = root.repository();
        let payload = b"before\r\n--XyAfter\r\n--Xy";
        let body = MultipartBody::new("XyZ").file("p.txt", payload);

        let bytes = body.to_bytes();
        let mut reader = BufReader::new(bytes.as_slice());
        ingest_upload(&mut reader, "XyZ", &repo, 1024).await.unwrap();

        assert_eq!(stored(&repo, "p.txt").await, payload);
    }

    #[tokio::test]
    async fn missing_closing_boundary_is_truncation() {
        let root = TempRoot::new();
        let repo = root.repository();
        let raw = b"--XyZ\r\nContent-Disposition: form-data; name=\"file\"; filename=\"a\"\r\n\r\nabc";

        let mut reader = BufReader::new(&raw[..]);
        let err = ingest_upload(&mut reader, "XyZ", &repo, 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Truncated(_)));
    }

    #[tokio::test]
    async fn body_ending_in_header_is_truncation() {
        let root = TempRoot::new();
        let repo = root.repository();
        let raw = b"--XyZ\r\nContent-Disposition: form-data; filename=\"a\"\r\n";

        let mut reader = BufReader::new(&raw[..]);
        let err = ingest_upload(&mut reader, "XyZ", &repo, 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::Truncated(_)));
        assert!(!repo.contains("a").await);
    }

    #[tokio::test]
    async fn missing_filename_is_rejected() {
        let root = TempRoot::new();
        let repo = root.repository();
        let raw = b"--XyZ\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nabc\r\n--XyZ--\r\n";

        let mut reader = BufReader::new(&raw[..]);
        let err = ingest_upload(&mut reader, "XyZ", &repo, 1024)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServerError::Protocol(ProtocolError::MissingFilename)
        ));
    }

    #[tokio::test]
    async fn oversized_header_is_rejected() {
        let root = TempRoot::new();
        let repo = root.repository();
        let body = MultipartBody::new("XyZ").file(&"n".repeat(200), b"x");

        let bytes = body.to_bytes();
        let mut reader = BufReader::new(bytes.as_slice());
        let err = ingest_upload(&mut reader, "XyZ", &repo, 64)
            .await
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[tokio::test]
    async fn reupload_overwrites_bytes() {
        let root = TempRoot::new();
        let repo = root.repository();

        for payload in [&b"first version, longer"[..], b"second"] {
            let bytes = MultipartBody::new("XyZ").file("same", payload).to_bytes();
            let mut reader = BufReader::new(bytes.as_slice());
            ingest_upload(&mut reader, "XyZ", &repo, 1024).await.unwrap();
        }

        assert_eq!(stored(&repo, "same").await, b"second");
    }

    #[tokio::test]
    async fn failed_reupload_keeps_previous_bytes() {
        let root = TempRoot::new();
        let repo = root.repository();

        let bytes = MultipartBody::new("XyZ").file("keep", b"original").to_bytes();
        let mut reader = BufReader::new(bytes.as_slice());
        ingest_upload(&mut reader, "XyZ", &repo, 1024).await.unwrap();

        let bytes = MultipartBody::new("XyZ")
            .file("keep", b"replacement that never finishes")
            .truncated()
            .to_bytes();
        let mut reader = BufReader::new(bytes.as_slice());
        let err = ingest_upload(&mut reader, "XyZ", &repo, 1024)
            .await
            .unwrap_err();

        assert!(matches!(err, ServerError::Truncated(_)));
        assert_eq!(stored(&repo, "keep").await, b"original");
    }
}
