//! In-memory document repository.
//!
//! [`InMemoryRepository`] keeps every state in a sharded table of
//! reference-counted snapshots. It implements the full
//! [`DocumentRepository`] trait; data is lost when the repository is
//! dropped or shut down.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use docstate_blob::{BlobStore, BlobStoreRegistry};
use docstate_query::{PartialList, Query};
use docstate_types::{BlobRef, DocId, State, Value};
use tracing::{debug, info, trace, warn};

use crate::blobs::{self, GcReport};
use crate::bootstrap;
use crate::config::RepositoryConfig;
use crate::error::{RepositoryError, Result};
use crate::idgen::{self, IdGenerator};
use crate::table::StateTable;
use crate::traits::DocumentRepository;

/// An in-memory implementation of [`DocumentRepository`].
pub struct InMemoryRepository {
    config: RepositoryConfig,
    ids: Box<dyn IdGenerator>,
    root_id: DocId,
    table: StateTable,
    /// Serializes creates when sibling names must be unique.
    create_lock: Mutex<()>,
    blobs: Arc<dyn BlobStore>,
    registry: Arc<BlobStoreRegistry>,
    closed: AtomicBool,
}

impl InMemoryRepository {
    /// Open a repository and register its blob store in `registry`.
    ///
    /// The root state exists before this returns. Fails with `ScopeInUse`
    /// (as `Blob`) if another live repository already uses the name, and with
    /// `Construction` if the root cannot be created.
    pub fn open(config: RepositoryConfig, registry: Arc<BlobStoreRegistry>) -> Result<Self> {
        config.validate()?;
        let blobs = blobs::open_store(&config.blobs, &config.name)?;
        registry.register(Arc::clone(&blobs))?;

        let ids = idgen::for_strategy(config.id_strategy);
        let root_id = ids.root_id();
        let table = StateTable::new(config.shards);
        if let Err(e) = bootstrap::bootstrap(&table, &root_id) {
            registry.unregister(&config.name)?;
            return Err(e);
        }

        info!(
            name = %config.name,
            root = %root_id,
            shards = table.shard_count(),
            unique_names = config.enforce_unique_names,
            "repository opened"
        );
        Ok(Self {
            config,
            ids,
            root_id,
            table,
            create_lock: Mutex::new(()),
            blobs,
            registry,
            closed: AtomicBool::new(false),
        })
    }

    /// A repository with default settings and a private registry.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        Self::open(RepositoryConfig::new(name), Arc::new(BlobStoreRegistry::new()))
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of stored states, root included.
    pub fn len(&self) -> Result<usize> {
        self.ensure_open()?;
        self.table.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Store a payload in this repository's blob scope.
    pub fn write_blob(&self, data: &[u8], name: Option<&str>, mime_type: Option<&str>) -> Result<BlobRef> {
        self.ensure_open()?;
        blobs::write_blob(self.blobs.as_ref(), data, name, mime_type)
    }

    /// Read the payload behind a reference taken from a stored state.
    pub fn read_blob(&self, blob: &BlobRef) -> Result<Vec<u8>> {
        self.ensure_open()?;
        blobs::read_blob(self.blobs.as_ref(), blob)
    }

    /// Delete blobs that no stored state references.
    ///
    /// A blob written with [`write_blob`](Self::write_blob) but not yet
    /// referenced by a created state is collected too; run this only while
    /// no writer is between those two steps.
    pub fn gc_blobs(&self) -> Result<GcReport> {
        self.ensure_open()?;
        let states = self.table.snapshot()?;
        let report = blobs::collect_garbage(self.blobs.as_ref(), states.iter().map(|s| &**s))?;
        info!(
            name = %self.config.name,
            scanned = report.blobs_scanned,
            removed = report.blobs_removed,
            bytes_freed = report.bytes_freed,
            "blob gc finished"
        );
        Ok(report)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(RepositoryError::Closed {
                name: self.config.name.clone(),
            });
        }
        Ok(())
    }

    fn require_id(state: &State) -> Result<DocId> {
        state.id().ok_or(RepositoryError::MissingId)
    }

    fn find_child(
        &self,
        parent_id: &DocId,
        name: &str,
        ignored: &HashSet<DocId>,
    ) -> Result<Option<State>> {
        self.table.find_map(|state| {
            let is_match = state.parent_id() == Some(parent_id.as_str())
                && state.name() == Some(name)
                && !state.id_str().is_some_and(|id| ignored.contains(id));
            is_match.then(|| state.clone())
        })
    }
}

impl DocumentRepository for InMemoryRepository {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn root_id(&self) -> Result<DocId> {
        self.ensure_open()?;
        Ok(self.root_id.clone())
    }

    fn new_id(&self) -> Result<DocId> {
        self.ensure_open()?;
        Ok(self.ids.new_id())
    }

    fn create_state(&self, state: State) -> Result<()> {
        self.ensure_open()?;
        let id = Self::require_id(&state)?;

        if !self.config.enforce_unique_names {
            self.table.insert_new(id.clone(), state)?;
            debug!(id = %id, "state created");
            return Ok(());
        }

        let _guard = self
            .create_lock
            .lock()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))?;
        if let (Some(parent), Some(name)) = (state.parent_id(), state.name()) {
            let parent = DocId::new(parent);
            if self.find_child(&parent, name, &HashSet::new())?.is_some() {
                return Err(RepositoryError::DuplicateName {
                    parent,
                    name: name.to_string(),
                });
            }
        }
        self.table.insert_new(id.clone(), state)?;
        debug!(id = %id, "state created");
        Ok(())
    }

    fn read_state(&self, id: &DocId) -> Result<Option<State>> {
        self.ensure_open()?;
        Ok(self.table.get(id.as_str())?.map(|state| State::clone(&state)))
    }

    fn update_state(&self, state: State) -> Result<()> {
        self.ensure_open()?;
        let id = Self::require_id(&state)?;
        self.table.replace(id.clone(), state)?;
        debug!(id = %id, "state updated");
        Ok(())
    }

    fn delete_state(&self, id: &DocId) -> Result<()> {
        self.ensure_open()?;
        self.table.remove(id)?;
        debug!(id = %id, "state deleted");
        Ok(())
    }

    fn read_child_state(
        &self,
        parent_id: &DocId,
        name: &str,
        ignored: &HashSet<DocId>,
    ) -> Result<Option<State>> {
        self.ensure_open()?;
        self.find_child(parent_id, name, ignored)
    }

    fn read_key_valued_states(&self, key: &str, value: &Value) -> Result<Vec<State>> {
        self.ensure_open()?;
        Ok(self
            .table
            .snapshot()?
            .into_iter()
            .filter(|state| state.get(key) == Some(value))
            .map(|state| State::clone(&state))
            .collect())
    }

    fn query_key_value_presence(
        &self,
        key: &str,
        value: &Value,
        ignored: &HashSet<DocId>,
    ) -> Result<bool> {
        self.ensure_open()?;
        let found = self.table.find_map(|state| {
            let hit = state.get(key) == Some(value)
                && !state.id_str().is_some_and(|id| ignored.contains(id));
            hit.then_some(())
        })?;
        Ok(found.is_some())
    }

    fn query_key_value_array(&self, key: &str, value: &Value) -> Result<BTreeSet<DocId>> {
        self.ensure_open()?;
        Ok(self
            .table
            .snapshot()?
            .iter()
            .filter(|state| state.get(key).is_some_and(|field| field.contains(value)))
            .filter_map(|state| state.id())
            .collect())
    }

    fn query_and_fetch(
        &self,
        query: &Query,
        ignored: &HashSet<DocId>,
    ) -> Result<PartialList<Arc<State>>> {
        self.ensure_open()?;
        let states = self.table.snapshot()?;
        trace!(name = %self.config.name, candidates = states.len(), "query scan");
        Ok(query.evaluate(states, ignored)?)
    }

    fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Err(RepositoryError::Closed {
                name: self.config.name.clone(),
            });
        }
        self.table.clear()?;
        self.registry.unregister(&self.config.name)?;
        info!(name = %self.config.name, "repository shut down");
        Ok(())
    }
}

impl Drop for InMemoryRepository {
    fn drop(&mut self) {
        if self.is_closed() {
            return;
        }
        if let Err(e) = self.registry.unregister(&self.config.name) {
            warn!(name = %self.config.name, error = %e, "blob scope not released on drop");
        }
    }
}

impl fmt::Debug for InMemoryRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("name", &self.config.name)
            .field("root_id", &self.root_id)
            .field("shards", &self.table.shard_count())
            .field("closed", &self.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlobBackend, IdStrategy};
    use docstate_blob::BlobError;
    use docstate_query::{Expression, FieldPath, OrderByExpr};
    use docstate_types::acl::{ADMINISTRATORS, MEMBERS, READ, WRITE};
    use docstate_types::keys::{KEY_NAME, KEY_PARENT_ID, KEY_TYPE, TYPE_ROOT};
    use docstate_types::{Access, Acp};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    }

    fn repo() -> InMemoryRepository {
        init_tracing();
        InMemoryRepository::new("test").unwrap()
    }

    fn none() -> HashSet<DocId> {
        HashSet::new()
    }

    fn doc(repo: &InMemoryRepository, parent: &DocId, name: &str) -> State {
        let id = repo.new_id().unwrap();
        State::document(&id, Some(parent), name, "File")
    }

    fn id_of(state: &State) -> DocId {
        state.id().unwrap()
    }

    // Builds { A: doc1 under root, B: doc2 under root, C: doc1 under A }.
    fn sample(repo: &InMemoryRepository) -> (DocId, DocId, DocId) {
        let root = repo.root_id().unwrap();
        let a = doc(repo, &root, "doc1");
        let b = doc(repo, &root, "doc2");
        let c = doc(repo, &id_of(&a), "doc1");
        let ids = (id_of(&a), id_of(&b), id_of(&c));
        repo.create_state(a).unwrap();
        repo.create_state(b).unwrap();
        repo.create_state(c).unwrap();
        ids
    }

    #[test]
    fn root_is_bootstrapped() {
        let repo = repo();
        let root = repo.read_state(&repo.root_id().unwrap()).unwrap().unwrap();
        assert_eq!(root.parent_id(), None);
        assert_eq!(root.get_str(KEY_TYPE), Some(TYPE_ROOT));

        let acp = Acp::from_state(&root).unwrap().unwrap();
        assert_eq!(acp.access(ADMINISTRATORS, WRITE), Access::Grant);
        assert_eq!(acp.access(MEMBERS, READ), Access::Grant);
        assert_eq!(repo.len().unwrap(), 1);
    }

    #[test]
    fn duplicate_create_fails_and_keeps_original() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let first = doc(&repo, &root, "a").with("title", "original");
        let id = id_of(&first);
        repo.create_state(first.clone()).unwrap();

        let second = State::document(&id, Some(&root), "b", "File");
        assert!(matches!(
            repo.create_state(second),
            Err(RepositoryError::AlreadyExists { id: dup }) if dup == id
        ));
        assert_eq!(repo.read_state(&id).unwrap(), Some(first));
    }

    #[test]
    fn create_requires_id() {
        let repo = repo();
        assert!(matches!(
            repo.create_state(State::new().with("title", "x")),
            Err(RepositoryError::MissingId)
        ));
    }

    #[test]
    fn update_replaces_whole_state() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let original = doc(&repo, &root, "a").with("title", "t").with("extra", 1i64);
        let id = id_of(&original);
        repo.create_state(original).unwrap();

        let replacement = State::document(&id, Some(&root), "a", "File").with("title", "t2");
        repo.update_state(replacement.clone()).unwrap();
        let stored = repo.read_state(&id).unwrap().unwrap();
        assert_eq!(stored, replacement);
        assert!(!stored.contains_key("extra"));
    }

    #[test]
    fn delete_then_read() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let state = doc(&repo, &root, "a");
        let id = id_of(&state);
        repo.create_state(state.clone()).unwrap();
        repo.delete_state(&id).unwrap();

        assert_eq!(repo.read_state(&id).unwrap(), None);
        assert!(matches!(repo.update_state(state), Err(RepositoryError::NotFound { .. })));
        assert!(matches!(repo.delete_state(&id), Err(RepositoryError::NotFound { .. })));
    }

    #[test]
    fn delete_does_not_cascade() {
        let repo = repo();
        let (a, _, c) = sample(&repo);
        repo.delete_state(&a).unwrap();
        assert!(repo.read_state(&c).unwrap().is_some());
    }

    #[test]
    fn batch_delete_stops_at_first_missing() {
        let repo = repo();
        let (a, b, c) = sample(&repo);
        let missing = DocId::new("missing");
        let err = repo.delete_states(&[a.clone(), missing.clone(), b.clone()]).unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { id } if id == missing));
        assert_eq!(repo.read_state(&a).unwrap(), None);
        assert!(repo.read_state(&b).unwrap().is_some());

        repo.delete_states(&[b.clone(), c.clone()]).unwrap();
        assert_eq!(repo.read_states(&[b, c]).unwrap(), vec![None, None]);
    }

    #[test]
    fn read_states_is_positional() {
        let repo = repo();
        let (a, b, _) = sample(&repo);
        let missing = DocId::new("nope");
        let out = repo
            .read_states(&[b.clone(), missing, a.clone(), b.clone()])
            .unwrap();
        assert_eq!(out.len(), 4);
        assert_eq!(out[0].as_ref().and_then(State::id), Some(b.clone()));
        assert!(out[1].is_none());
        assert_eq!(out[2].as_ref().and_then(State::id), Some(a));
        assert_eq!(out[3].as_ref().and_then(State::id), Some(b));
    }

    #[test]
    fn child_lookup_honors_ignored() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let (a, _, c) = sample(&repo);

        let child = repo.read_child_state(&root, "doc1", &none()).unwrap().unwrap();
        assert_eq!(id_of(&child), a);
        assert!(!repo.has_child(&root, "doc3", &none()).unwrap());
        assert_eq!(
            repo.read_child_state(&a, "doc1", &none()).unwrap().map(|s| id_of(&s)),
            Some(c)
        );

        let ignored: HashSet<DocId> = [a.clone()].into_iter().collect();
        assert!(!repo.has_child(&root, "doc1", &ignored).unwrap());
        assert!(repo.has_child(&root, "doc2", &ignored).unwrap());
    }

    #[test]
    fn sibling_listing_paginates() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let (a, b, _) = sample(&repo);
        let children = || {
            Query::new(Expression::equals(FieldPath::key(KEY_PARENT_ID), &root))
                .order_by(OrderByExpr::asc(FieldPath::key(KEY_NAME)))
                .limit(1)
        };

        let first = repo.query_and_fetch(&children(), &none()).unwrap();
        assert_eq!(first.total_size, 2);
        assert_eq!(first.items.iter().map(|s| id_of(s)).collect::<Vec<_>>(), vec![a]);

        let second = repo.query_and_fetch(&children().offset(1), &none()).unwrap();
        assert_eq!(second.total_size, 2);
        assert_eq!(second.items.iter().map(|s| id_of(s)).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn query_respects_ignored_and_limits() {
        let repo = repo();
        let (a, _, _) = sample(&repo);
        let ignored: HashSet<DocId> = [a].into_iter().collect();
        let all = repo.query_and_fetch(&Query::all(), &ignored).unwrap();
        assert_eq!(all.total_size, 3);
        assert_eq!(all.len(), 3);

        let past_end = repo
            .query_and_fetch(&Query::all().limit(2).offset(10), &none())
            .unwrap();
        assert!(past_end.is_empty());
        assert_eq!(past_end.total_size, 4);
    }

    #[test]
    fn query_with_principals_sees_root_only() {
        let repo = repo();
        sample(&repo);
        let page = repo
            .query_and_fetch(&Query::all().principals([MEMBERS]), &none())
            .unwrap();
        assert_eq!(page.total_size, 1);
        assert_eq!(page.items[0].id(), Some(repo.root_id().unwrap()));

        let page = repo
            .query_and_fetch(&Query::all().principals(["stranger"]), &none())
            .unwrap();
        assert_eq!(page.total_size, 0);
    }

    #[test]
    fn invalid_query_is_an_error() {
        let repo = repo();
        let query = Query::new(Expression::like(FieldPath::key("t"), "x\\"));
        assert!(matches!(
            repo.query_and_fetch(&query, &none()),
            Err(RepositoryError::Query(_))
        ));
    }

    #[test]
    fn query_results_are_detached_snapshots() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let state = doc(&repo, &root, "a").with("v", 1i64);
        let id = id_of(&state);
        repo.create_state(state).unwrap();

        let before = repo.query_and_fetch(&Query::all().deep_copy(true), &none()).unwrap();
        repo.update_state(State::document(&id, Some(&root), "a", "File").with("v", 2i64))
            .unwrap();
        let old = before.iter().find(|s| s.id() == Some(id.clone())).unwrap();
        assert_eq!(old.get("v"), Some(&Value::Long(1)));
        assert_eq!(
            repo.read_state(&id).unwrap().unwrap().get("v"),
            Some(&Value::Long(2))
        );
    }

    #[test]
    fn key_value_scans() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let tagged = doc(&repo, &root, "t1").with("tags", vec!["red", "blue"]).with("color", "red");
        let plain = doc(&repo, &root, "t2").with("tags", "red").with("color", "green");
        let (tagged_id, plain_id) = (id_of(&tagged), id_of(&plain));
        repo.create_state(tagged).unwrap();
        repo.create_state(plain).unwrap();

        let red = Value::from("red");
        let hits = repo.read_key_valued_states("color", &red).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(id_of(&hits[0]), tagged_id);

        let ids = repo.query_key_value_array("tags", &red).unwrap();
        assert_eq!(ids, [tagged_id.clone(), plain_id].into_iter().collect());
        assert!(repo.query_key_value_array("tags", &Value::from("blue")).unwrap().contains(&tagged_id));

        assert!(repo.query_key_value_presence("color", &red, &none()).unwrap());
        let ignored: HashSet<DocId> = [tagged_id].into_iter().collect();
        assert!(!repo.query_key_value_presence("color", &red, &ignored).unwrap());
        // Key/value reads do not filter ignored ids.
        assert_eq!(repo.read_key_valued_states("color", &red).unwrap().len(), 1);
    }

    #[test]
    fn unique_names_are_optional() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        repo.create_state(doc(&repo, &root, "same")).unwrap();
        repo.create_state(doc(&repo, &root, "same")).unwrap();

        let strict = InMemoryRepository::open(
            RepositoryConfig::new("strict").with_unique_names(true),
            Arc::new(BlobStoreRegistry::new()),
        )
        .unwrap();
        let root = strict.root_id().unwrap();
        strict.create_state(doc(&strict, &root, "same")).unwrap();
        assert!(matches!(
            strict.create_state(doc(&strict, &root, "same")),
            Err(RepositoryError::DuplicateName { name, .. }) if name == "same"
        ));
        strict.create_state(doc(&strict, &root, "other")).unwrap();
    }

    #[test]
    fn random_ids_are_used_when_configured() {
        init_tracing();
        let repo = InMemoryRepository::open(
            RepositoryConfig::new("uuid").with_id_strategy(IdStrategy::Random),
            Arc::new(BlobStoreRegistry::new()),
        )
        .unwrap();
        assert_eq!(
            repo.root_id().unwrap().as_str(),
            "00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(repo.new_id().unwrap().as_str().len(), 36);
    }

    #[test]
    fn blobs_round_trip_through_states() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let blob = repo
            .write_blob(b"%PDF-1.7", Some("report.pdf"), Some("application/pdf"))
            .unwrap();
        let state = doc(&repo, &root, "report").with("file:content", blob.to_state());
        let id = id_of(&state);
        repo.create_state(state).unwrap();

        let stored = repo.read_state(&id).unwrap().unwrap();
        let refs = BlobRef::collect_from(&stored);
        assert_eq!(refs, vec![blob.clone()]);
        assert_eq!(repo.read_blob(&refs[0]).unwrap(), b"%PDF-1.7");
    }

    #[test]
    fn gc_removes_unreferenced_blobs() {
        let repo = repo();
        let root = repo.root_id().unwrap();
        let kept = repo.write_blob(b"kept", None, None).unwrap();
        let orphan = repo.write_blob(b"orphaned", None, None).unwrap();
        let state = doc(&repo, &root, "f").with("content", kept.to_state());
        repo.create_state(state).unwrap();

        let report = repo.gc_blobs().unwrap();
        assert_eq!(report.blobs_removed, 1);
        assert_eq!(report.bytes_freed, 8);
        assert!(repo.read_blob(&kept).is_ok());
        assert!(matches!(
            repo.read_blob(&orphan),
            Err(RepositoryError::Blob(BlobError::NotFound(_)))
        ));
    }

    #[test]
    fn filesystem_blobs_live_under_repository_name() {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let config = RepositoryConfig::new("fsrepo").with_blobs(BlobBackend::Filesystem {
            root: dir.path().to_path_buf(),
        });
        let repo = InMemoryRepository::open(config, Arc::new(BlobStoreRegistry::new())).unwrap();
        let blob = repo.write_blob(b"on disk", None, None).unwrap();
        assert!(dir.path().join("fsrepo").is_dir());
        assert_eq!(repo.read_blob(&blob).unwrap(), b"on disk");
    }

    #[test]
    fn scope_names_cannot_be_shared() {
        init_tracing();
        let registry = Arc::new(BlobStoreRegistry::new());
        let first = InMemoryRepository::open(RepositoryConfig::new("shared"), Arc::clone(&registry)).unwrap();
        let clash = InMemoryRepository::open(RepositoryConfig::new("shared"), Arc::clone(&registry));
        assert!(matches!(
            clash,
            Err(RepositoryError::Blob(BlobError::ScopeInUse(_)))
        ));
        assert!(registry.get("shared").unwrap().is_some());

        first.shutdown().unwrap();
        assert!(registry.get("shared").unwrap().is_none());
        InMemoryRepository::open(RepositoryConfig::new("shared"), registry).unwrap();
    }

    #[test]
    fn dropping_releases_scope_name() {
        init_tracing();
        let registry = Arc::new(BlobStoreRegistry::new());
        {
            let _repo =
                InMemoryRepository::open(RepositoryConfig::new("dropped"), Arc::clone(&registry)).unwrap();
            assert_eq!(registry.scopes().unwrap(), vec!["dropped".to_string()]);
        }
        assert!(registry.get("dropped").unwrap().is_none());
        let reopened = InMemoryRepository::open(RepositoryConfig::new("dropped"), Arc::clone(&registry)).unwrap();

        reopened.shutdown().unwrap();
        let other = InMemoryRepository::open(RepositoryConfig::new("dropped"), Arc::clone(&registry)).unwrap();
        drop(reopened);
        assert!(registry.get("dropped").unwrap().is_some());
        drop(other);
        assert!(registry.scopes().unwrap().is_empty());
    }

    #[test]
    fn shutdown_closes_everything() {
        let repo = repo();
        let (a, _, _) = sample(&repo);
        repo.shutdown().unwrap();
        assert!(repo.is_closed());
        assert_eq!(repo.name(), "test");

        let closed = |r: Result<()>| matches!(r, Err(RepositoryError::Closed { .. }));
        assert!(closed(repo.read_state(&a).map(|_| ())));
        assert!(closed(repo.root_id().map(|_| ())));
        assert!(closed(repo.new_id().map(|_| ())));
        assert!(closed(repo.delete_state(&a)));
        assert!(closed(repo.query_and_fetch(&Query::all(), &none()).map(|_| ())));
        assert!(closed(repo.shutdown()));
    }

    #[test]
    fn invalid_config_is_rejected_before_registration() {
        let registry = Arc::new(BlobStoreRegistry::new());
        let err = InMemoryRepository::open(RepositoryConfig::new("").with_shards(0), Arc::clone(&registry))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Config(_)));
        assert!(registry.scopes().unwrap().is_empty());
    }

    #[test]
    fn concurrent_writers_on_distinct_and_shared_ids() {
        let repo = Arc::new(repo());
        let root = repo.root_id().unwrap();
        let shared = doc(&repo, &root, "shared").with("n", 0i64);
        let shared_id = id_of(&shared);
        repo.create_state(shared).unwrap();

        std::thread::scope(|scope| {
            for worker in 0..8i64 {
                let repo = Arc::clone(&repo);
                let root = root.clone();
                let shared_id = shared_id.clone();
                scope.spawn(move || {
                    for i in 0..50i64 {
                        let state = doc(&repo, &root, &format!("w{worker}-{i}"));
                        repo.create_state(state).unwrap();
                        let update = State::document(&shared_id, Some(&root), "shared", "File")
                            .with("n", worker * 1000 + i)
                            .with("writer", worker);
                        repo.update_state(update).unwrap();
                        let seen = repo.read_state(&shared_id).unwrap().unwrap();
                        let n = seen.get("n").and_then(Value::as_long).unwrap();
                        let writer = seen.get("writer").and_then(Value::as_long).unwrap();
                        assert_eq!(n / 1000, writer, "torn state observed");
                    }
                });
            }
        });

        assert_eq!(repo.len().unwrap(), 2 + 8 * 50);
        let page = repo.query_and_fetch(&Query::all().limit(10), &none()).unwrap();
        assert_eq!(page.total_size, 2 + 8 * 50);
        assert_eq!(page.len(), 10);
    }
}
