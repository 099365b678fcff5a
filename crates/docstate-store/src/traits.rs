//! The [`DocumentRepository`] trait.
//!
//! A repository is the single owner of a hierarchy of document states. It is
//! consumed by a session layer that adds transactions and caching on top;
//! every call here acts on the live collection immediately.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use docstate_query::{PartialList, Query};
use docstate_types::{DocId, State, Value};

use crate::error::Result;

/// Storage backend for document states.
///
/// Implementations must be `Send + Sync`. Mutations are atomic per id:
/// readers observe the state before or after a write, never a mix. No
/// ordering is promised across ids.
///
/// Absence is reported as `Ok(None)` / `Ok(false)` by lookups; only
/// `update_state` and `delete_state` treat a missing id as an error.
pub trait DocumentRepository: Send + Sync {
    /// Stable repository name, also its blob scope.
    fn name(&self) -> &str;

    /// Well-known id of the root state.
    fn root_id(&self) -> Result<DocId>;

    /// A fresh id never returned before by this repository.
    fn new_id(&self) -> Result<DocId>;

    /// Store a new state under its `sys:id`.
    ///
    /// Fails with `AlreadyExists` if the id is taken.
    fn create_state(&self, state: State) -> Result<()>;

    fn read_state(&self, id: &DocId) -> Result<Option<State>>;

    /// One slot per input id, in input order.
    fn read_states(&self, ids: &[DocId]) -> Result<Vec<Option<State>>> {
        ids.iter().map(|id| self.read_state(id)).collect()
    }

    /// Replace the whole state stored under its `sys:id`.
    ///
    /// Fails with `NotFound` if the id is absent.
    fn update_state(&self, state: State) -> Result<()>;

    /// Remove one state. Children are left in place.
    fn delete_state(&self, id: &DocId) -> Result<()>;

    /// Remove several states, stopping at the first absent id.
    ///
    /// States deleted before the failure stay deleted.
    fn delete_states(&self, ids: &[DocId]) -> Result<()> {
        ids.iter().try_for_each(|id| self.delete_state(id))
    }

    /// First state under `parent_id` named `name` whose id is not ignored.
    fn read_child_state(
        &self,
        parent_id: &DocId,
        name: &str,
        ignored: &HashSet<DocId>,
    ) -> Result<Option<State>>;

    fn has_child(&self, parent_id: &DocId, name: &str, ignored: &HashSet<DocId>) -> Result<bool> {
        Ok(self.read_child_state(parent_id, name, ignored)?.is_some())
    }

    /// Every state whose field `key` is exactly `value`.
    fn read_key_valued_states(&self, key: &str, value: &Value) -> Result<Vec<State>>;

    /// Whether some non-ignored state has field `key` equal to `value`.
    fn query_key_value_presence(
        &self,
        key: &str,
        value: &Value,
        ignored: &HashSet<DocId>,
    ) -> Result<bool>;

    /// Ids of states whose field `key` is, or is a list containing, `value`.
    fn query_key_value_array(&self, key: &str, value: &Value) -> Result<BTreeSet<DocId>>;

    /// Filter, order and paginate every non-ignored state.
    fn query_and_fetch(
        &self,
        query: &Query,
        ignored: &HashSet<DocId>,
    ) -> Result<PartialList<Arc<State>>>;

    /// Release every state and the blob scope. Later calls fail with `Closed`.
    fn shutdown(&self) -> Result<()>;
}
