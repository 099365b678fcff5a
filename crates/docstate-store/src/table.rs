//! Sharded id → state table.

use std::collections::hash_map::{Entry, RandomState};
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use docstate_types::{DocId, State};

use crate::error::{RepositoryError, Result};

type Shard = RwLock<HashMap<DocId, Arc<State>>>;

/// Canonical copy of every stored state.
///
/// Ids hash to one of a fixed number of shards, each behind its own lock, so
/// writers to different ids rarely contend and two writers to the same id are
/// serialized. Values are swapped whole: a reader holding an `Arc` from
/// before an update keeps seeing the old state.
pub(crate) struct StateTable {
    shards: Vec<Shard>,
    hasher: RandomState,
}

impl StateTable {
    pub(crate) fn new(shards: usize) -> Self {
        Self {
            shards: (0..shards.max(1)).map(|_| RwLock::new(HashMap::new())).collect(),
            hasher: RandomState::new(),
        }
    }

    pub(crate) fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard(&self, id: &str) -> &Shard {
        let index = self.hasher.hash_one(id) as usize % self.shards.len();
        &self.shards[index]
    }

    fn read_shard<'a>(shard: &'a Shard) -> Result<RwLockReadGuard<'a, HashMap<DocId, Arc<State>>>> {
        shard
            .read()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))
    }

    fn write_shard<'a>(shard: &'a Shard) -> Result<RwLockWriteGuard<'a, HashMap<DocId, Arc<State>>>> {
        shard
            .write()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))
    }

    pub(crate) fn get(&self, id: &str) -> Result<Option<Arc<State>>> {
        Ok(Self::read_shard(self.shard(id))?.get(id).cloned())
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &str) -> Result<bool> {
        Ok(Self::read_shard(self.shard(id))?.contains_key(id))
    }

    /// Insert a state under an id that must not be present yet.
    pub(crate) fn insert_new(&self, id: DocId, state: State) -> Result<()> {
        let mut shard = Self::write_shard(self.shard(id.as_str()))?;
        match shard.entry(id) {
            Entry::Occupied(entry) => Err(RepositoryError::AlreadyExists {
                id: entry.key().clone(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(Arc::new(state));
                Ok(())
            }
        }
    }

    /// Replace the state stored under an existing id.
    pub(crate) fn replace(&self, id: DocId, state: State) -> Result<()> {
        let mut shard = Self::write_shard(self.shard(id.as_str()))?;
        match shard.get_mut(&id) {
            Some(slot) => {
                *slot = Arc::new(state);
                Ok(())
            }
            None => Err(RepositoryError::NotFound { id }),
        }
    }

    pub(crate) fn remove(&self, id: &DocId) -> Result<Arc<State>> {
        Self::write_shard(self.shard(id.as_str()))?
            .remove(id)
            .ok_or_else(|| RepositoryError::NotFound { id: id.clone() })
    }

    /// Every stored state, shard by shard.
    ///
    /// Each shard is read under its own lock, so the result holds whole
    /// states but is not a snapshot across shards.
    pub(crate) fn snapshot(&self) -> Result<Vec<Arc<State>>> {
        let mut out = Vec::new();
        for shard in &self.shards {
            out.extend(Self::read_shard(shard)?.values().cloned());
        }
        Ok(out)
    }

    /// Visit states shard by shard until `f` returns `Some`.
    pub(crate) fn find_map<T>(&self, mut f: impl FnMut(&State) -> Option<T>) -> Result<Option<T>> {
        for shard in &self.shards {
            let guard = Self::read_shard(shard)?;
            if let Some(found) = guard.values().find_map(|state| f(state.as_ref())) {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }

    pub(crate) fn len(&self) -> Result<usize> {
        let mut total = 0;
        for shard in &self.shards {
            total += Self::read_shard(shard)?.len();
        }
        Ok(total)
    }

    pub(crate) fn clear(&self) -> Result<()> {
        for shard in &self.shards {
            Self::write_shard(shard)?.clear();
        }
        Ok(())
    }
}
