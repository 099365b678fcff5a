//! In-memory hierarchical document repository.
//!
//! A repository holds document states in a tree rooted at a bootstrapped
//! root, answers child and key/value lookups, and evaluates structured
//! queries over the whole collection.
//!
//! # Key Types
//!
//! - [`DocumentRepository`] -- the storage contract consumed by a session layer
//! - [`InMemoryRepository`] -- sharded, lock-per-shard implementation
//! - [`RepositoryConfig`] -- name, id strategy, sharding and blob backend
//! - [`IdGenerator`] -- sequential or UUID v7 identifiers
//!
//! # Consistency
//!
//! Each create, update or delete is atomic for its id. Scans and queries see
//! every state either before or after any single write, but may mix old and
//! new states across ids.

pub mod blobs;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod idgen;
pub mod memory;
mod table;
pub mod traits;

pub use blobs::GcReport;
pub use config::{BlobBackend, IdStrategy, RepositoryConfig};
pub use error::{RepositoryError, Result};
pub use idgen::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use memory::InMemoryRepository;
pub use traits::DocumentRepository;
