//! Saved script CRUD (§4.5, §6): same shape as plugins, under
//! `data/scripts/`, with `id = "script-<uuid>"`.

use std::path::PathBuf;

use chrono::Utc;
use jsdeob_ast::model::PluginBlob;
use serde::Deserialize;
use serde_json::Value;

use crate::blob_store::BlobStore;
use crate::error::StoreResult;
use crate::plugins::{PluginPortable, PluginStore};

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub config: Value,
}

pub struct ScriptStore {
    blobs: BlobStore,
}

impl ScriptStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Ok(Self { blobs: BlobStore::open(data_dir.into().join("scripts"))? })
    }

    pub fn list(&self) -> StoreResult<Vec<PluginBlob>> {
        self.blobs.list()
    }

    pub fn get(&self, id: &str) -> StoreResult<PluginBlob> {
        self.blobs.get(id)
    }

    pub fn create(&self, input: ScriptInput) -> StoreResult<PluginBlob> {
        PluginStore::validate(&input.code)?;
        let blob = PluginBlob::new_script(input.name, input.description, input.code, input.config);
        self.blobs.put(&blob.id, &blob)?;
        Ok(blob)
    }

    pub fn update(&self, id: &str, input: ScriptInput) -> StoreResult<PluginBlob> {
        PluginStore::validate(&input.code)?;
        let existing: PluginBlob = self.blobs.get(id)?;
        let updated = PluginBlob {
            id: existing.id,
            name: input.name,
            description: input.description,
            code: input.code,
            config: input.config,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            category: existing.category,
        };
        self.blobs.put(id, &updated)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.blobs.delete(id)
    }

    pub fn export(&self, id: &str) -> StoreResult<PluginPortable> {
        let blob = self.blobs.get::<PluginBlob>(id)?;
        Ok(PluginPortable::from(&blob))
    }

    pub fn import(&self, portable: PluginPortable) -> StoreResult<PluginBlob> {
        PluginStore::validate(&portable.code)?;
        let blob = PluginBlob::new_script(portable.name, portable.description, portable.code, portable.config);
        self.blobs.put(&blob.id, &blob)?;
        Ok(blob)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn creates_with_script_prefixed_id() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::open(dir.path()).unwrap();
        let input = ScriptInput { name: "A".into(), description: String::new(), code: "function run(){}".into(), config: serde_json::json!({}) };
        let created = store.create(input).unwrap();
        assert!(created.id.starts_with("script-"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn get_missing_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = ScriptStore::open(dir.path()).unwrap();
        assert!(store.get("script-missing").is_err());
    }
}
