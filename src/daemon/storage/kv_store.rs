use std::{
    collections::HashMap,
    fs::{self, File, OpenOptions},
    io::ErrorKind,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use anyhow::{anyhow, bail, Result};
use fs4::fs_std::FileExt;
use tracing::debug;

/// Interface for abstracting the key-value store that holds the persisted state. Calls are
/// synchronous and expected to be fast.
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueStore {
    /// Returns the raw value under `key`, [None] when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// In-memory store. Clones share the same entries, which lets tests keep a handle on a store
/// that was moved into the service.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock is poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock is poisoned"))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow!("Memory store lock is poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

const LOCK_FILE: &str = ".store.lock";

/// Store keeping every key in its own `<key>.json` file inside a directory.
///
/// Writes go to a temporary file first and are renamed into place. All operations hold a lock on
/// a shared lock file (shared for reads, exclusive for writes) so the CLI can read while the
/// service is writing.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            bail!("Illegal store key {key:?}");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }

    fn lock_file(&self) -> Result<File, std::io::Error> {
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILE))
    }

    fn with_lock<T>(&self, exclusive: bool, action: impl FnOnce() -> Result<T>) -> Result<T> {
        let lock = self.lock_file()?;
        if exclusive {
            FileExt::lock_exclusive(&lock)?;
        } else {
            FileExt::lock_shared(&lock)?;
        }
        let result = action();
        FileExt::unlock(&lock)?;
        result
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        self.with_lock(false, || match fs::read_to_string(&path) {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        })
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.with_lock(true, || {
            let tmp_path = path.with_extension("tmp");
            fs::write(&tmp_path, value)?;
            fs::rename(&tmp_path, &path)?;
            debug!("Wrote {} bytes into {path:?}", value.len());
            Ok(())
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        self.with_lock(true, || match fs::remove_file(&path) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{FileStore, KeyValueStore, MemoryStore};

    #[test]
    fn test_file_store_basic() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().join("store"))?;

        assert_eq!(store.get("focuswave_wellbeing")?, None);

        store.set("focuswave_wellbeing", "{\"a\":1}")?;
        store.set("focuswave_wellbeing", "{\"a\":2}")?;
        assert_eq!(store.get("focuswave_wellbeing")?.as_deref(), Some("{\"a\":2}"));
        assert!(!dir.path().join("store/focuswave_wellbeing.tmp").exists());

        store.remove("focuswave_wellbeing")?;
        store.remove("focuswave_wellbeing")?;
        assert_eq!(store.get("focuswave_wellbeing")?, None);
        Ok(())
    }

    #[test]
    fn test_file_store_rejects_paths() -> Result<()> {
        let dir = tempdir()?;
        let store = FileStore::new(dir.path().to_path_buf())?;

        assert!(store.set("../escape", "{}").is_err());
        assert!(store.get("").is_err());
        Ok(())
    }

    #[test]
    fn test_memory_store_clones_share_entries() -> Result<()> {
        let store = MemoryStore::new();
        let handle = store.clone();

        store.set("key", "value")?;
        assert_eq!(handle.get("key")?.as_deref(), Some("value"));
        assert_eq!(handle.len(), 1);

        handle.remove("key")?;
        assert!(store.is_empty());
        Ok(())
    }
}
