//! Generic JSON-file blob store (§4.5, §5): one file per record, keyed by
//! its own `id`. Shared by the plugin and script stores, which differ only
//! in id format and directory.
//!
//! Writes are serialized store-wide via an internal mutex and land through
//! a temp-file-then-rename swap, so readers only ever observe a complete
//! file (§5: "Readers see a snapshot... and never observe partial writes").

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{StoreError, StoreResult};

pub struct BlobStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl BlobStore {
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir, write_lock: Mutex::new(()) })
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    pub fn list<T: DeserializeOwned>(&self) -> StoreResult<Vec<T>> {
        let mut out = Vec::new();
        if !self.dir.is_dir() {
            return Ok(out);
        }
        let mut entries: Vec<_> = std::fs::read_dir(&self.dir)?
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("json"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let content = std::fs::read_to_string(entry.path())?;
            let value: T = serde_json::from_str(&content)?;
            out.push(value);
        }
        Ok(out)
    }

    pub fn get<T: DeserializeOwned>(&self, id: &str) -> StoreResult<T> {
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn put<T: Serialize>(&self, id: &str, value: &T) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = self.path_for(id);
        let content = serde_json::to_string_pretty(value)?;
        atomic_write(&path, &content)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        let _guard = self.write_lock.lock().unwrap();
        let path = self.path_for(id);
        if !path.is_file() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        std::fs::remove_file(path)?;
        Ok(())
    }

    pub fn exists(&self, id: &str) -> bool {
        self.path_for(id).is_file()
    }
}

fn atomic_write(path: &Path, content: &str) -> StoreResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_name = format!(".{}.tmp-{}", path.file_name().unwrap().to_string_lossy(), std::process::id());
    let tmp_path = dir.join(tmp_name);
    std::fs::write(&tmp_path, content)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Record {
        id: String,
        value: u32,
    }

    #[test]
    fn round_trips_put_get_list_delete() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();

        let record = Record { id: "a".to_string(), value: 1 };
        store.put("a", &record).unwrap();

        let fetched: Record = store.get("a").unwrap();
        assert_eq!(fetched, record);

        let all: Vec<Record> = store.list().unwrap();
        assert_eq!(all.len(), 1);

        store.delete("a").unwrap();
        assert!(!store.exists("a"));
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();
        let result: StoreResult<Record> = store.get("missing");
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn delete_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = BlobStore::open(dir.path()).unwrap();
        assert!(matches!(store.delete("missing"), Err(StoreError::NotFound(_))));
    }
}
