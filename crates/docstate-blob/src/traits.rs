use docstate_types::BlobDigest;

use crate::error::{BlobError, BlobResult};

/// Content-addressed store for binary payloads referenced by document states.
///
/// All implementations must satisfy these invariants:
/// - Blobs are immutable once written; the same bytes always produce the
///   same digest, so writes are idempotent.
/// - Each store owns a private location identified by its scope name.
///   Two stores with different scopes never see each other's blobs.
/// - Reads verify the digest; corruption is reported, never returned.
pub trait BlobStore: Send + Sync {
    /// Stable scope name this store was initialized with.
    fn scope(&self) -> &str;

    /// Store bytes and return their digest.
    fn store(&self, data: &[u8]) -> BlobResult<BlobDigest>;

    /// Read a blob by digest.
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    fn read(&self, digest: &BlobDigest) -> BlobResult<Option<Vec<u8>>>;

    /// Check whether a blob exists.
    fn exists(&self, digest: &BlobDigest) -> BlobResult<bool>;

    /// Delete a blob. Returns `true` if it existed.
    ///
    /// Intended for garbage collection only.
    fn delete(&self, digest: &BlobDigest) -> BlobResult<bool>;

    /// Every digest held by this store, sorted.
    fn list(&self) -> BlobResult<Vec<BlobDigest>>;

    /// Read a blob that must exist.
    fn retrieve(&self, digest: &BlobDigest) -> BlobResult<Vec<u8>> {
        self.read(digest)?.ok_or(BlobError::NotFound(*digest))
    }
}
