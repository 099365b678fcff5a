use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{RepositoryError, Result};

/// How new document identifiers are issued.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Counter-based ids (`"0"` for the root, then `"1"`, `"2"`, ...).
    #[default]
    Sequential,
    /// UUID v7 ids; the root is the nil UUID.
    Random,
}

/// Where a repository keeps blob payloads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BlobBackend {
    #[default]
    Memory,
    /// One directory per repository name under `root`.
    Filesystem { root: PathBuf },
}

/// Configuration for an in-memory repository.
///
/// Every field has a default, so a TOML file only needs the keys it changes:
///
/// ```toml
/// name = "content"
/// id_strategy = "random"
/// shards = 32
/// enforce_unique_names = true
///
/// [blobs]
/// kind = "filesystem"
/// root = "/var/lib/docstate/blobs"
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Repository identity, also used as its blob scope name.
    pub name: String,
    pub id_strategy: IdStrategy,
    /// Number of independently locked partitions of the state table.
    pub shards: usize,
    /// Reject a second live state with the same `(parent, name)` at create time.
    pub enforce_unique_names: bool,
    pub blobs: BlobBackend,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            id_strategy: IdStrategy::Sequential,
            shards: 16,
            enforce_unique_names: false,
            blobs: BlobBackend::Memory,
        }
    }
}

impl RepositoryConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_unique_names(mut self, enforce: bool) -> Self {
        self.enforce_unique_names = enforce;
        self
    }

    pub fn with_blobs(mut self, blobs: BlobBackend) -> Self {
        self.blobs = blobs;
        self
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s).map_err(|e| RepositoryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| RepositoryError::Config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| RepositoryError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(RepositoryError::Config("name must not be empty".into()));
        }
        if self.name.starts_with('.') || self.name.contains(['/', '\\']) {
            return Err(RepositoryError::Config(format!(
                "name {:?} cannot be used as a blob scope",
                self.name
            )));
        }
        if self.shards == 0 {
            return Err(RepositoryError::Config("shards must be greater than zero".into()));
        }
        Ok(())
    }
}
