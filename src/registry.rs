/// Server catalog registry behind an injected storage interface
///
/// The execution engine never touches this module; it is wired in at the
/// service boundary only.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Registry error types
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("server '{0}' already registered")]
    AlreadyExists(String),

    #[error("registry storage error: {0}")]
    Storage(String),
}

/// Result type for registry operations
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// One registered server catalog entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// Registration time, seconds since the Unix epoch
    #[serde(default)]
    pub registered_at: Option<u64>,
}

impl CatalogEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: None,
            metadata: serde_json::Map::new(),
            registered_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}

/// Storage interface for the server catalog
pub trait CatalogStore {
    /// Register a new entry; rejects duplicate names
    fn register(&mut self, entry: CatalogEntry) -> RegistryResult<()>;

    /// All entries, ordered by name
    fn list(&self) -> RegistryResult<Vec<CatalogEntry>>;
}

/// Stamp the registration time if the caller didn't
fn stamped(mut entry: CatalogEntry) -> CatalogEntry {
    if entry.registered_at.is_none() {
        entry.registered_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| d.as_secs());
    }
    entry
}

/// In-memory store, used in tests and embedded setups
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogStore for MemoryStore {
    fn register(&mut self, entry: CatalogEntry) -> RegistryResult<()> {
        if self.entries.contains_key(&entry.name) {
            return Err(RegistryError::AlreadyExists(entry.name));
        }
        let entry = stamped(entry);
        self.entries.insert(entry.name.clone(), entry);
        Ok(())
    }

    fn list(&self) -> RegistryResult<Vec<CatalogEntry>> {
        Ok(self.entries.values().cloned().collect())
    }
}

/// JSON-file-backed store persisting the catalog across restarts
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, CatalogEntry>,
}

impl JsonFileStore {
    /// Load the catalog from `path`, starting empty when the file is absent
    pub fn open<P: AsRef<Path>>(path: P) -> RegistryResult<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|e| {
                RegistryError::Storage(format!("failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&raw).map_err(|e| {
                RegistryError::Storage(format!("failed to parse {}: {}", path.display(), e))
            })?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, entries })
    }

    fn persist(&self) -> RegistryResult<()> {
        let raw = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| RegistryError::Storage(format!("failed to serialize catalog: {}", e)))?;
        fs::write(&self.path, raw).map_err(|e| {
            RegistryError::Storage(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}

impl CatalogStore for JsonFileStore {
    fn register(&mut self, entry: CatalogEntry) -> RegistryResult<()> {
        if self.entries.contains_key(&entry.name) {
            return Err(RegistryError::AlreadyExists(entry.name));
        }
        let entry = stamped(entry);
        self.entries.insert(entry.name.clone(), entry);
        self.persist()
    }

    fn list(&self) -> RegistryResult<Vec<CatalogEntry>> {
        Ok(self.entries.values().cloned().collect())
    }
}
