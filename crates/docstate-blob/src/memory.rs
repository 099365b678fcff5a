use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use docstate_types::BlobDigest;
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::hasher::ContentHasher;
use crate::traits::BlobStore;

/// In-memory, HashMap-based blob store.
///
/// All blobs are held in memory behind a `RwLock` for safe concurrent
/// access. Payloads are cloned on read and write.
pub struct InMemoryBlobStore {
    scope: String,
    blobs: RwLock<HashMap<BlobDigest, Vec<u8>>>,
}

impl InMemoryBlobStore {
    /// Create a new empty store for `scope`.
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> BlobResult<usize> {
        Ok(self.read_guard()?.len())
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> BlobResult<bool> {
        Ok(self.read_guard()?.is_empty())
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> BlobResult<u64> {
        Ok(self.read_guard()?.values().map(|b| b.len() as u64).sum())
    }

    /// Remove all blobs from the store.
    pub fn clear(&self) -> BlobResult<()> {
        self.write_guard()?.clear();
        Ok(())
    }

    fn read_guard(&self) -> BlobResult<RwLockReadGuard<'_, HashMap<BlobDigest, Vec<u8>>>> {
        self.blobs
            .read()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))
    }

    fn write_guard(&self) -> BlobResult<RwLockWriteGuard<'_, HashMap<BlobDigest, Vec<u8>>>> {
        self.blobs
            .write()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))
    }
}

impl BlobStore for InMemoryBlobStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn store(&self, data: &[u8]) -> BlobResult<BlobDigest> {
        let digest = ContentHasher::BLOB.hash(data);
        let mut map = self.write_guard()?;
        map.entry(digest).or_insert_with(|| {
            debug!(scope = %self.scope, digest = %digest.short_hex(), len = data.len(), "blob stored");
            data.to_vec()
        });
        Ok(digest)
    }

    fn read(&self, digest: &BlobDigest) -> BlobResult<Option<Vec<u8>>> {
        Ok(self.read_guard()?.get(digest).cloned())
    }

    fn exists(&self, digest: &BlobDigest) -> BlobResult<bool> {
        Ok(self.read_guard()?.contains_key(digest))
    }

    fn delete(&self, digest: &BlobDigest) -> BlobResult<bool> {
        Ok(self.write_guard()?.remove(digest).is_some())
    }

    fn list(&self) -> BlobResult<Vec<BlobDigest>> {
        let mut digests: Vec<BlobDigest> = self.read_guard()?.keys().copied().collect();
        digests.sort();
        Ok(digests)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.blobs.read().map(|m| m.len()).unwrap_or_default();
        f.debug_struct("InMemoryBlobStore")
            .field("scope", &self.scope)
            .field("blob_count", &count)
            .finish()
    }
}
