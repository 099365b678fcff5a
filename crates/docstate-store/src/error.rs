use docstate_blob::BlobError;
use docstate_query::QueryError;
use docstate_types::{DocId, TypeError};

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// `create_state` was given an id that is already stored.
    #[error("document already exists: {id}")]
    AlreadyExists { id: DocId },

    /// `update_state` or `delete_state` was given an unknown id.
    #[error("document not found: {id}")]
    NotFound { id: DocId },

    /// A state handed to the repository carries no `sys:id`.
    #[error("state has no identifier")]
    MissingId,

    /// Root bootstrap failed; the repository was not returned.
    #[error("repository construction failed: {0}")]
    Construction(String),

    /// The repository has been shut down.
    #[error("repository {name} is shut down")]
    Closed { name: String },

    /// Another live state already has this name under this parent.
    #[error("name {name:?} already used under parent {parent}")]
    DuplicateName { parent: DocId, name: String },

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("blob store: {0}")]
    Blob(#[from] BlobError),

    #[error("query: {0}")]
    Query(#[from] QueryError),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Result alias for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
