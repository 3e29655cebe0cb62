// SPDX-License-Identifier: AGPL-3.0
// User Favorites Core - Local key/value storage
//
// A string-keyed store with a JSON-file backend and an in-memory backend.
// The backend is picked once at startup; everything above only sees the trait.

use crate::types::{AppError, AppSettings};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Storage key holding the favorite user ids
pub const FAVORITES_KEY: &str = "user_favorites";

const STORAGE_FILE_NAME: &str = "storage.json";

/// Whole-value string storage addressed by key
pub trait KeyStore: Send + Sync {
    /// Read a value. A missing key is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    /// Replace the value stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    fn remove(&self, key: &str) -> Result<(), AppError>;
}

/// Non-persistent store, used when no durable backend is available
#[derive(Default)]
pub struct MemoryKeyStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// File-based store: one JSON object of key/value strings, rewritten on every change
pub struct FileKeyStore {
    entries: RwLock<BTreeMap<String, String>>,
    file_path: PathBuf,
}

impl FileKeyStore {
    /// Open the store in the platform data directory
    pub fn new() -> Result<Self, AppError> {
        let data_dir = crate::project_dirs()?.data_dir().to_path_buf();
        Self::open(data_dir)
    }

    /// Open the store inside `dir`, creating the directory if needed
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).map_err(|e| {
            AppError::StorageUnavailable(format!("Failed to create data dir {:?}: {}", dir, e))
        })?;

        let file_path = dir.join(STORAGE_FILE_NAME);
        let entries = if file_path.exists() {
            match fs::read_to_string(&file_path) {
                Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                    tracing::warn!("Failed to parse storage file, starting fresh: {}", e);
                    BTreeMap::new()
                }),
                Err(e) => {
                    tracing::warn!("Failed to read storage file, starting fresh: {}", e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            entries: RwLock::new(entries),
            file_path,
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), AppError> {
        let content = serde_json::to_string_pretty(entries)
            .map_err(|e| AppError::Serialization(format!("Failed to serialize storage: {}", e)))?;

        fs::write(&self.file_path, content)
            .map_err(|e| AppError::FileIo(format!("Failed to write storage: {}", e)))?;

        Ok(())
    }

    /// Apply `change` and write the result; the cache only moves if the write lands
    fn modify(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<(), AppError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = entries.clone();
        change(&mut next);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl KeyStore for FileKeyStore {
    fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        Ok(self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AppError> {
        self.modify(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), AppError> {
        self.modify(|entries| {
            entries.remove(key);
        })
    }
}

/// Pick the storage backend for this run.
///
/// Uses the file store unless persistence is disabled or the store cannot be
/// opened, in which case favorites live in memory for the session.
pub fn open_key_store(settings: &AppSettings) -> Arc<dyn KeyStore> {
    if !settings.persist_favorites {
        tracing::info!("Favorites persistence disabled, using in-memory storage");
        return Arc::new(MemoryKeyStore::new());
    }

    let opened = match &settings.data_dir {
        Some(dir) => FileKeyStore::open(dir),
        None => FileKeyStore::new(),
    };

    match opened {
        Ok(store) => {
            tracing::info!("Using storage file {:?}", store.file_path());
            Arc::new(store)
        }
        Err(e) => {
            tracing::warn!("Storage unavailable, using in-memory fallback: {}", e);
            Arc::new(MemoryKeyStore::new())
        }
    }
}

/// Favorite ids stored as a JSON array under [`FAVORITES_KEY`]
#[derive(Clone)]
pub struct FavoritesStorage {
    store: Arc<dyn KeyStore>,
}

impl FavoritesStorage {
    pub fn new(store: Arc<dyn KeyStore>) -> Self {
        Self { store }
    }

    /// Load the stored favorite set. Never fails; problems yield an empty set.
    pub fn load(&self) -> BTreeSet<u32> {
        match self.read() {
            Ok(ids) => ids,
            Err(e) => {
                tracing::error!("Error getting favorites: {}", e);
                BTreeSet::new()
            }
        }
    }

    /// Write the whole set, replacing whatever was stored
    pub fn save(&self, ids: &BTreeSet<u32>) -> Result<(), AppError> {
        let ids: Vec<u32> = ids.iter().copied().collect();
        let content = serde_json::to_string(&ids)?;
        self.store.set(FAVORITES_KEY, &content)
    }

    /// Add `id` on top of whatever `load` yields; an unreadable value gets overwritten
    pub fn add(&self, id: u32) -> Result<(), AppError> {
        let mut ids = self.load();
        if ids.insert(id) {
            self.save(&ids)?;
        }
        Ok(())
    }

    pub fn remove(&self, id: u32) -> Result<(), AppError> {
        let mut ids = self.load();
        ids.remove(&id);
        self.save(&ids)
    }

    fn read(&self) -> Result<BTreeSet<u32>, AppError> {
        match self.store.get(FAVORITES_KEY)? {
            Some(content) => {
                let ids: Vec<u32> = serde_json::from_str(&content)?;
                Ok(ids.into_iter().collect())
            }
            None => Ok(BTreeSet::new()),
        }
    }
}
