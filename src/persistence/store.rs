use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::KeyValueStore;
use crate::error::PersistError;

/// In-memory store; survives a `Session` being dropped and rebuilt
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON object file on disk
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store, starting empty if the file does not exist yet
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref().to_path_buf();
        let values = match std::fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No save file at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, values })
    }

    fn flush(&self) -> Result<(), PersistError> {
        let json = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.values.insert(key.to_string(), value.to_string());
        self.flush()?;
        log::debug!("Saved `{}` to {}", key, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        std::env::temp_dir().join(format!(
            "tower_flap_{}_{}_{}.json",
            name,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("highscore").unwrap(), None);
        store.set("highscore", "12").unwrap();
        assert_eq!(store.get("highscore").unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let path = scratch_path("reopen");
        {
            let mut store = JsonFileStore::open(&path).unwrap();
            assert_eq!(store.get("highscore").unwrap(), None);
            store.set("highscore", "33").unwrap();
        }
        let store = JsonFileStore::open(&path).unwrap();
        assert_eq!(store.get("highscore").unwrap().as_deref(), Some("33"));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_file_store_rejects_corrupt_file() {
        let path = scratch_path("corrupt");
        std::fs::write(&path, "{{{{").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
        let _ = std::fs::remove_file(&path);
    }
}
