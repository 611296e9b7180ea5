//! String key-value storage
//!
//! Mirrors the browser's LocalStorage: player name, settings, tuning overrides,
//! submitted-score markers and the local leaderboard all live behind this.

use std::collections::BTreeMap;

use crate::error::StorageError;

/// LocalStorage-shaped persistence
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Volatile in-process storage
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl KeyValueStore for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        self.items.remove(key);
        Ok(())
    }
}

/// Storage persisted as a single JSON object on disk
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStorage {
    path: std::path::PathBuf,
    items: BTreeMap<String, String>,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<std::path::PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let items = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::info!("Opened storage at {} ({} keys)", path.display(), items.len());
        Ok(Self { path, items })
    }

    /// Open the store, starting empty if the file is unreadable or corrupt
    pub fn open_or_empty(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                log::warn!("Storage at {} unusable ({}), starting fresh", path.display(), e);
                Self {
                    path,
                    items: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// Write to a temp file then rename over the old one
    fn flush(&self) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.items)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        if self.items.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

/// Storage key of the last used player name
pub const PLAYER_NAME_KEY: &str = "playerName";

/// Remembers the last player name between sessions.
///
/// Storage failures are logged and otherwise ignored: losing the prefilled
/// name never blocks a run.
pub trait NameStore {
    fn persist_player_name(&mut self, name: &str);
    fn load_player_name(&self) -> Option<String>;
}

impl<T: KeyValueStore + ?Sized> NameStore for T {
    fn persist_player_name(&mut self, name: &str) {
        if let Err(e) = self.set_item(PLAYER_NAME_KEY, name) {
            log::warn!("Could not save player name: {}", e);
        }
    }

    fn load_player_name(&self) -> Option<String> {
        match self.get_item(PLAYER_NAME_KEY) {
            Ok(name) => name.filter(|n| !n.trim().is_empty()),
            Err(e) => {
                log::warn!("Could not load player name: {}", e);
                None
            }
        }
    }
}
