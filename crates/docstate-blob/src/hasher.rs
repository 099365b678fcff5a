use docstate_types::BlobDigest;

/// Computes blob digests.
///
/// A digest is BLAKE3 over `domain:` followed by the payload. Bumping the
/// domain tag changes every digest, so stores written under different tags
/// never share addresses.
pub struct ContentHasher {
    domain: &'static str,
}

impl ContentHasher {
    /// Digests of every blob written by this crate.
    pub const BLOB: Self = Self {
        domain: "docstate-blob-v1",
    };

    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Digest of a payload.
    pub fn hash(&self, data: &[u8]) -> BlobDigest {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(data);
        BlobDigest::from_hash(*hasher.finalize().as_bytes())
    }

    /// Whether `data` still matches a digest recorded earlier.
    pub fn verify(&self, data: &[u8], expected: &BlobDigest) -> bool {
        self.hash(data) == *expected
    }

    pub fn domain(&self) -> &str {
        self.domain
    }
}
