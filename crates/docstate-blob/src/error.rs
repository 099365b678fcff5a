use docstate_types::BlobDigest;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// The requested blob was not found.
    #[error("blob not found: {0}")]
    NotFound(BlobDigest),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {digest}: computed {computed}")]
    HashMismatch {
        digest: BlobDigest,
        computed: BlobDigest,
    },

    /// Stored length disagrees with the reference held by a document.
    #[error("length mismatch for {digest}: expected {expected}, found {actual}")]
    LengthMismatch {
        digest: BlobDigest,
        expected: u64,
        actual: u64,
    },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Another store is already registered under this scope.
    #[error("blob scope already in use: {0}")]
    ScopeInUse(String),

    /// The scope name cannot be used as a storage location.
    #[error("invalid blob scope {scope:?}: {reason}")]
    InvalidScope { scope: String, reason: String },

    /// Internal lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

/// Result alias for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;
