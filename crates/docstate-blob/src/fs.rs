use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use docstate_types::BlobDigest;
use tracing::{debug, warn};

use crate::error::{BlobError, BlobResult};
use crate::hasher::ContentHasher;
use crate::traits::BlobStore;

/// Filesystem blob store.
///
/// Layout under the configured root:
/// ```text
/// <root>/<scope>/<first 2 hex chars>/<remaining 62 hex chars>
/// ```
/// Writes go to a temporary file in the scope directory and are renamed into
/// place, so a blob path either holds the full payload or does not exist.
#[derive(Debug)]
pub struct FsBlobStore {
    scope: String,
    dir: PathBuf,
}

impl FsBlobStore {
    /// Open (creating if needed) the private directory for `scope` under `root`.
    pub fn open(root: impl AsRef<Path>, scope: impl Into<String>) -> BlobResult<Self> {
        let scope = scope.into();
        validate_scope(&scope)?;
        let dir = root.as_ref().join(&scope);
        fs::create_dir_all(&dir)?;
        debug!(scope = %scope, dir = %dir.display(), "opened filesystem blob store");
        Ok(Self { scope, dir })
    }

    /// Directory holding this scope's blobs.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn blob_path(&self, digest: &BlobDigest) -> PathBuf {
        let hex = digest.to_hex();
        self.dir.join(&hex[..2]).join(&hex[2..])
    }
}

/// Scope names become directory names; reject anything that could escape
/// the root or collide with the fan-out directories.
pub(crate) fn validate_scope(scope: &str) -> BlobResult<()> {
    let invalid = |reason: &str| {
        Err(BlobError::InvalidScope {
            scope: scope.to_string(),
            reason: reason.to_string(),
        })
    };
    if scope.is_empty() {
        return invalid("empty");
    }
    if scope.starts_with('.') {
        return invalid("starts with '.'");
    }
    if scope.contains(['/', '\\']) {
        return invalid("contains a path separator");
    }
    Ok(())
}

impl BlobStore for FsBlobStore {
    fn scope(&self) -> &str {
        &self.scope
    }

    fn store(&self, data: &[u8]) -> BlobResult<BlobDigest> {
        let digest = ContentHasher::BLOB.hash(data);
        let path = self.blob_path(&digest);
        if path.exists() {
            return Ok(digest);
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| BlobError::Io(e.error))?;
        debug!(scope = %self.scope, digest = %digest.short_hex(), len = data.len(), "blob written");
        Ok(digest)
    }

    fn read(&self, digest: &BlobDigest) -> BlobResult<Option<Vec<u8>>> {
        let data = match fs::read(self.blob_path(digest)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let computed = ContentHasher::BLOB.hash(&data);
        if computed != *digest {
            return Err(BlobError::HashMismatch {
                digest: *digest,
                computed,
            });
        }
        Ok(Some(data))
    }

    fn exists(&self, digest: &BlobDigest) -> BlobResult<bool> {
        Ok(self.blob_path(digest).is_file())
    }

    fn delete(&self, digest: &BlobDigest) -> BlobResult<bool> {
        match fs::remove_file(self.blob_path(digest)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list(&self) -> BlobResult<Vec<BlobDigest>> {
        let mut digests = Vec::new();
        for fanout in fs::read_dir(&self.dir)? {
            let fanout = fanout?;
            if !fanout.file_type()?.is_dir() {
                continue;
            }
            let prefix = fanout.file_name().to_string_lossy().into_owned();
            for entry in fs::read_dir(fanout.path())? {
                let entry = entry?;
                let name = entry.file_name().to_string_lossy().into_owned();
                match BlobDigest::from_hex(&format!("{prefix}{name}")) {
                    Ok(digest) => digests.push(digest),
                    Err(e) => warn!(path = %entry.path().display(), "skipping stray file in blob store: {e}"),
                }
            }
        }
        digests.sort();
        Ok(digests)
    }
}
