//! Glue between document states and the repository's blob store.

use std::collections::HashSet;
use std::sync::Arc;

use docstate_blob::{BlobError, BlobStore, FsBlobStore, InMemoryBlobStore};
use docstate_types::{BlobDigest, BlobRef, State};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::BlobBackend;
use crate::error::Result;

/// Outcome of a blob garbage collection pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GcReport {
    pub blobs_scanned: usize,
    pub blobs_live: usize,
    pub blobs_removed: usize,
    pub bytes_freed: u64,
}

/// Open the blob store configured for a repository scope.
pub(crate) fn open_store(backend: &BlobBackend, scope: &str) -> Result<Arc<dyn BlobStore>> {
    Ok(match backend {
        BlobBackend::Memory => Arc::new(InMemoryBlobStore::new(scope)),
        BlobBackend::Filesystem { root } => Arc::new(FsBlobStore::open(root, scope)?),
    })
}

/// Store `data` and describe it as a reference to embed in a state.
pub(crate) fn write_blob(
    store: &dyn BlobStore,
    data: &[u8],
    name: Option<&str>,
    mime_type: Option<&str>,
) -> Result<BlobRef> {
    let digest = store.store(data)?;
    let mut blob = BlobRef::new(digest, data.len() as u64);
    blob.name = name.map(str::to_string);
    blob.mime_type = mime_type.map(str::to_string);
    debug!(
        scope = store.scope(),
        digest = %digest.short_hex(),
        len = data.len(),
        "blob attached"
    );
    Ok(blob)
}

/// Fetch the bytes behind `blob`, checking the recorded length.
pub(crate) fn read_blob(store: &dyn BlobStore, blob: &BlobRef) -> Result<Vec<u8>> {
    let data = store.retrieve(&blob.digest)?;
    if data.len() as u64 != blob.length {
        return Err(BlobError::LengthMismatch {
            digest: blob.digest,
            expected: blob.length,
            actual: data.len() as u64,
        }
        .into());
    }
    Ok(data)
}

/// Delete every blob in `store` not referenced by one of `states`.
///
/// Blobs written but not yet referenced by a stored state look unreferenced;
/// callers must keep writers out while this runs.
pub(crate) fn collect_garbage<'a>(
    store: &dyn BlobStore,
    states: impl IntoIterator<Item = &'a State>,
) -> Result<GcReport> {
    let live: HashSet<BlobDigest> = states
        .into_iter()
        .flat_map(BlobRef::collect_from)
        .map(|blob| blob.digest)
        .collect();

    let mut report = GcReport::default();
    for digest in store.list()? {
        report.blobs_scanned += 1;
        if live.contains(&digest) {
            report.blobs_live += 1;
            continue;
        }
        let size = match store.read(&digest) {
            Ok(data) => data.map_or(0, |d| d.len() as u64),
            Err(e) => {
                warn!(scope = store.scope(), digest = %digest, error = %e, "removing unreadable blob");
                0
            }
        };
        if store.delete(&digest)? {
            warn!(scope = store.scope(), digest = %digest.short_hex(), size, "unreferenced blob removed");
            report.blobs_removed += 1;
            report.bytes_freed += size;
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepositoryError;

    #[test]
    fn write_then_read() {
        let store = InMemoryBlobStore::new("t");
        let blob = write_blob(&store, b"hello", Some("a.txt"), Some("text/plain")).unwrap();
        assert_eq!(blob.length, 5);
        assert_eq!(blob.name.as_deref(), Some("a.txt"));
        assert_eq!(read_blob(&store, &blob).unwrap(), b"hello");
    }

    #[test]
    fn length_mismatch_is_reported() {
        let store = InMemoryBlobStore::new("t");
        let mut blob = write_blob(&store, b"hello", None, None).unwrap();
        blob.length = 4;
        assert!(matches!(
            read_blob(&store, &blob),
            Err(RepositoryError::Blob(BlobError::LengthMismatch { .. }))
        ));
    }

    #[test]
    fn missing_blob_is_not_found() {
        let store = InMemoryBlobStore::new("t");
        let blob = BlobRef::new(BlobDigest::from_hash([9; 32]), 1);
        assert!(matches!(
            read_blob(&store, &blob),
            Err(RepositoryError::Blob(BlobError::NotFound(_)))
        ));
    }

    #[test]
    fn gc_keeps_referenced_blobs() {
        let store = InMemoryBlobStore::new("t");
        let kept = write_blob(&store, b"keep me", None, None).unwrap();
        write_blob(&store, b"drop me", None, None).unwrap();
        let nested = State::new().with("content", kept.to_state());
        let doc = State::new().with("files", vec![nested]);

        let report = collect_garbage(&store, [&doc]).unwrap();
        assert_eq!(report.blobs_scanned, 2);
        assert_eq!(report.blobs_live, 1);
        assert_eq!(report.blobs_removed, 1);
        assert_eq!(report.bytes_freed, 7);
        assert!(store.exists(&kept.digest).unwrap());
        assert_eq!(store.len().unwrap(), 1);
    }
}
