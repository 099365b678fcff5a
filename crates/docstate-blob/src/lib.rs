//! Content-addressed blob side-store for docstate.
//!
//! Document states never hold binary payloads. They hold a
//! [`BlobRef`](docstate_types::BlobRef) whose digest is resolved by a
//! [`BlobStore`] scoped to the owning repository.
//!
//! # Storage Backends
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`FsBlobStore`] -- one file per blob under `<root>/<scope>/`
//!
//! # Design Rules
//!
//! 1. Blobs are immutable; digests are domain-separated BLAKE3 hashes.
//! 2. Every store is bound to one scope name and one private location.
//! 3. Reads verify content against the digest.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod fs;
pub mod hasher;
pub mod memory;
pub mod registry;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use hasher::ContentHasher;
pub use memory::InMemoryBlobStore;
pub use registry::BlobStoreRegistry;
pub use traits::BlobStore;
