//! Persistence port and adapters
//!
//! The store is a whole-value key/value collaborator: every mutation writes the
//! complete post-mutation collection under its key. There is no merge, so the
//! last writer wins.

use std::path::{Path, PathBuf};

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{StorageError, StorageResult};
use crate::EntityId;

/// Global key holding every account
pub const ACCOUNTS_KEY: &str = "accounts";

/// Global key holding every support ticket
pub const TICKETS_KEY: &str = "tickets";

/// Persistence collaborator
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, if any
    fn load(&self, key: &str) -> StorageResult<Option<Value>>;

    /// Overwrite the value stored under `key`
    fn save(&self, key: &str, value: Value) -> StorageResult<()>;
}

/// Tenant-scoped collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TenantCollection {
    Clients,
    Services,
    Offers,
    Records,
}

impl TenantCollection {
    /// Key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clients => "clients",
            Self::Services => "services",
            Self::Offers => "offers",
            Self::Records => "records",
        }
    }

    /// Storage key of this collection for one account
    pub fn key(&self, account_id: &EntityId) -> String {
        format!("{}:{}", self.as_str(), account_id)
    }
}

/// Load a JSON array stored under `key`; a missing key is an empty collection
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Vec<T>> {
    match store.load(key)? {
        Some(value) => serde_json::from_value(value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        }),
        None => Ok(Vec::new()),
    }
}

/// Overwrite `key` with the full collection
pub fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> StorageResult<()> {
    let value = serde_json::to_value(items).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.save(key, value)
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys written so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been written
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> StorageResult<Option<Value>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn save(&self, key: &str, value: Value) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// One pretty-printed JSON file per key under a directory
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `root`
    pub fn open(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root).map_err(|source| StorageError::Io {
            key: root.display().to_string(),
            source,
        })?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.root.join(format!("{file}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> StorageResult<Option<Value>> {
        let path = self.path_for(key);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StorageError::Io { key: key.to_string(), source }),
        };
        let value = serde_json::from_str(&content).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        Ok(Some(value))
    }

    fn save(&self, key: &str, value: Value) -> StorageResult<()> {
        let path = self.path_for(key);
        let content = serde_json::to_string_pretty(&value).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;
        std::fs::write(&path, content).map_err(|source| StorageError::Io {
            key: key.to_string(),
            source,
        })?;
        debug!(key, path = %path.display(), "collection written");
        Ok(())
    }
}
