//! Foundation types for docstate.
//!
//! This crate provides the data model shared by every docstate crate: the
//! document identifier, the tagged-union field value, the document state
//! record, access control policies, and blob references.
//!
//! # Key Types
//!
//! - [`DocId`] -- Unique identifier of a document state
//! - [`Value`] -- Field value: scalar, scalar list, nested state, or list of states
//! - [`State`] -- Field map stored for one node of the hierarchy
//! - [`Acp`] / [`Acl`] / [`Ace`] -- Ordered, first-match-wins access control
//! - [`BlobDigest`] / [`BlobRef`] -- Content digest and its in-state reference

pub mod acl;
pub mod blob;
pub mod digest;
pub mod error;
pub mod id;
pub mod keys;
pub mod state;
pub mod value;

pub use acl::{Access, Ace, Acl, Acp};
pub use blob::BlobRef;
pub use digest::BlobDigest;
pub use error::TypeError;
pub use id::DocId;
pub use state::State;
pub use value::Value;
