//! Plugin CRUD (§4.5, §6): saved plugin blobs backed by [`BlobStore`], plus
//! the folder-promotion behavior that turns a blob save-with-folder into a
//! source file under `plugins/<category>/`.

use std::path::PathBuf;

use chrono::Utc;
use jsdeob_ast::model::PluginBlob;
use jsdeob_ast::services::parse;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blob_store::BlobStore;
use crate::catalog::Catalog;
use crate::error::{StoreError, StoreResult};
use crate::folder_plugins::sanitize_folder_name;

/// Input for create/update; `folder`, when set, promotes the save into a
/// folder-plugin source file instead of a blob (§4.5).
#[derive(Debug, Clone, Deserialize)]
pub struct PluginInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub code: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub folder: Option<String>,
}

/// The `{ name, description, code, config }` import/export shape (§4.5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginPortable {
    pub name: String,
    pub description: String,
    pub code: String,
    pub config: Value,
}

impl From<&PluginBlob> for PluginPortable {
    fn from(blob: &PluginBlob) -> Self {
        Self { name: blob.name.clone(), description: blob.description.clone(), code: blob.code.clone(), config: blob.config.clone() }
    }
}

pub struct PluginStore {
    blobs: BlobStore,
    plugins_dir: PathBuf,
}

impl PluginStore {
    pub fn open(data_dir: impl Into<PathBuf>, plugins_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Ok(Self { blobs: BlobStore::open(data_dir.into().join("plugins"))?, plugins_dir: plugins_dir.into() })
    }

    pub fn list(&self) -> StoreResult<Vec<PluginBlob>> {
        self.blobs.list()
    }

    pub fn get(&self, id: &str) -> StoreResult<PluginBlob> {
        self.blobs.get(id)
    }

    /// Validates `code` by parsing it, per §4.5 "Create: validate code by
    /// parsing it; on invalid, reject with parse error."
    pub fn validate(code: &str) -> StoreResult<()> {
        parse(code).map_err(|e| StoreError::TransformValidation(e.to_string()))?;
        Ok(())
    }

    /// Creates a saved plugin blob, or, when `folder` is set, promotes it
    /// straight into a folder-plugin source file and reloads `catalog` so
    /// the new plugin is immediately visible.
    pub fn create(&self, input: PluginInput, catalog: &Catalog) -> StoreResult<PluginBlob> {
        Self::validate(&input.code)?;

        if let Some(folder) = &input.folder {
            self.write_folder_plugin(folder, &input)?;
            catalog.reload()?;
            // Folder plugins are not blobs; surface a synthetic record so
            // the caller still gets a PluginBlob-shaped response.
            let now = Utc::now();
            return Ok(PluginBlob {
                id: format!("{}-{}", sanitize_folder_name(folder), slugify(&input.name)),
                name: input.name,
                description: input.description,
                code: input.code,
                config: input.config,
                created_at: now,
                updated_at: now,
                category: Some(sanitize_folder_name(folder)),
            });
        }

        let blob = PluginBlob::new_plugin(input.name, input.description, input.code, input.config);
        self.blobs.put(&blob.id, &blob)?;
        Ok(blob)
    }

    pub fn update(&self, id: &str, input: PluginInput) -> StoreResult<PluginBlob> {
        Self::validate(&input.code)?;
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
        Self::validate(&portable.code)?;
        let blob = PluginBlob::new_plugin(portable.name, portable.description, portable.code, portable.config);
        self.blobs.put(&blob.id, &blob)?;
        Ok(blob)
    }

    fn write_folder_plugin(&self, folder: &str, input: &PluginInput) -> StoreResult<()> {
        let folder = sanitize_folder_name(folder);
        let dir = self.plugins_dir.join(&folder);
        std::fs::create_dir_all(&dir)?;
        let filename = format!("{}.js", slugify(&input.name));
        let header = format!("/**\n * {}\n * {}\n * Category: {}\n */\n", input.name, input.description, folder);
        std::fs::write(dir.join(filename), format!("{header}{}", input.code))?;
        Ok(())
    }
}

fn slugify(name: &str) -> String {
    let mut out = String::new();
    let mut last_was_dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() { "plugin".to_string() } else { out }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn harness() -> (TempDir, PluginStore, Catalog) {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("data");
        let plugins_dir = dir.path().join("plugins");
        let store = PluginStore::open(&data_dir, &plugins_dir).unwrap();
        let catalog = Catalog::load(&plugins_dir).unwrap();
        (dir, store, catalog)
    }

    #[test]
    fn creates_and_lists_a_plugin_blob() {
        let (_dir, store, catalog) = harness();
        let input = PluginInput { name: "My Plugin".into(), description: "desc".into(), code: "function run(){}".into(), config: serde_json::json!({}), folder: None };
        let created = store.create(input, &catalog).unwrap();
        assert_eq!(created.category.as_deref(), Some("user-saved"));
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn rejects_invalid_code_on_create() {
        let (_dir, store, catalog) = harness();
        let input = PluginInput { name: "Bad".into(), description: String::new(), code: "function( {{{".into(), config: serde_json::json!({}), folder: None };
        assert!(matches!(store.create(input, &catalog), Err(StoreError::TransformValidation(_))));
    }

    #[test]
    fn saving_with_folder_promotes_to_folder_plugin() {
        let (dir, store, catalog) = harness();
        let input = PluginInput { name: "Strip Comments".into(), description: "removes comments".into(), code: "function run(){}".into(), config: serde_json::json!({}), folder: Some("Renaming!".into()) };
        store.create(input, &catalog).unwrap();

        let plugins_dir = dir.path().join("plugins").join("renaming");
        assert!(plugins_dir.join("strip-comments.js").is_file());
        assert_eq!(catalog.folder_plugins().len(), 1);
    }

    #[test]
    fn update_preserves_created_at_and_touches_updated_at() {
        let (_dir, store, catalog) = harness();
        let input = PluginInput { name: "A".into(), description: String::new(), code: "function run(){}".into(), config: serde_json::json!({}), folder: None };
        let created = store.create(input, &catalog).unwrap();

        let update = PluginInput { name: "B".into(), description: "new desc".into(), code: "function run(){}".into(), config: serde_json::json!({}), folder: None };
        let updated = store.update(&created.id, update).unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.name, "B");
    }

    #[test]
    fn delete_missing_is_not_found() {
        let (_dir, store, _catalog) = harness();
        assert!(matches!(store.delete("missing"), Err(StoreError::NotFound(_))));
    }
}
