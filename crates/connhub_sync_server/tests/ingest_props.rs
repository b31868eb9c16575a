//! Property tests for upload ingestion.

use connhub_storage::FileRepository;
use connhub_sync_protocol::delimiter_for;
use connhub_sync_server::ingest_upload;
use connhub_testkit::prelude::*;
use proptest::prelude::*;
use tokio::io::{AsyncReadExt, BufReader};

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

fn ingest(repo: &FileRepository, body: &MultipartBody, read_size: usize) -> (String, Vec<u8>) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async {
        let bytes = body.to_bytes();
        let mut reader = BufReader::with_capacity(read_size, bytes.as_slice());
        let ingested = ingest_upload(&mut reader, body.boundary(), repo, 16 * 1024)
            .await
            .unwrap();

        let mut stored = repo.open(&ingested.name).await.unwrap();
        let mut out = Vec::new();
        stored.file.read_to_end(&mut out).await.unwrap();
        assert_eq!(ingested.bytes, out.len() as u64);
        (ingested.name, out)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_payload_round_trips(
        name in filename_strategy(),
        boundary in boundary_strategy(),
        payload in payload_strategy(),
        read_size in chunk_size_strategy(),
    ) {
        prop_assume!(!contains(&payload, &delimiter_for(&boundary)));

        let root = TempRoot::new();
        let repo = root.repository();
        let body = MultipartBody::new(boundary).file(&name, &payload);

        let (stored_name, stored_bytes) = ingest(&repo, &body, read_size);
        prop_assert_eq!(stored_name, name);
        prop_assert_eq!(stored_bytes, payload);
    }
}
