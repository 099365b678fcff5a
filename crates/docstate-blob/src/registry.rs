use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::traits::BlobStore;

/// Scope-name directory of live blob stores.
///
/// Each repository registers its blob store under its own name so that
/// collaborators can discover it, and so that two live repositories can never
/// share (and garbage-collect) the same blob scope.
#[derive(Default)]
pub struct BlobStoreRegistry {
    stores: RwLock<BTreeMap<String, Arc<dyn BlobStore>>>,
}

impl BlobStoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `store` under its scope name.
    pub fn register(&self, store: Arc<dyn BlobStore>) -> BlobResult<()> {
        let scope = store.scope().to_string();
        let mut stores = self
            .stores
            .write()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        if stores.contains_key(&scope) {
            return Err(BlobError::ScopeInUse(scope));
        }
        debug!(scope = %scope, "blob store registered");
        stores.insert(scope, store);
        Ok(())
    }

    /// Look up the store registered for `scope`.
    pub fn get(&self, scope: &str) -> BlobResult<Option<Arc<dyn BlobStore>>> {
        let stores = self
            .stores
            .read()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        Ok(stores.get(scope).cloned())
    }

    /// Remove the registration for `scope`. Returns `true` if it existed.
    pub fn unregister(&self, scope: &str) -> BlobResult<bool> {
        let mut stores = self
            .stores
            .write()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        Ok(stores.remove(scope).is_some())
    }

    /// Registered scope names, sorted.
    pub fn scopes(&self) -> BlobResult<Vec<String>> {
        let stores = self
            .stores
            .read()
            .map_err(|e| BlobError::LockPoisoned(e.to_string()))?;
        Ok(stores.keys().cloned().collect())
    }
}

impl std::fmt::Debug for BlobStoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scopes: Vec<String> = self
            .stores
            .read()
            .map(|s| s.keys().cloned().collect())
            .unwrap_or_default();
        f.debug_struct("BlobStoreRegistry")
            .field("scopes", &scopes)
            .finish()
    }
}
