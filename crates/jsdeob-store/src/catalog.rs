//! The combined built-in + folder-plugin catalogue (§4.5, §9 "Folder plugin
//! hot-reload"). Read-only at run time; [`Catalog::reload`] builds a fresh
//! snapshot off to the side and swaps it in atomically so in-flight
//! requests always see either the pre- or post-reload catalogue, never a
//! mix.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use jsdeob_ast::model::{Transform, TransformMeta};

use crate::error::StoreResult;
use crate::folder_plugins::{self, FolderPlugin};

/// Per-category summary for `GET /api/plugins` (§6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub folder: Option<String>,
    pub count: usize,
}

struct Snapshot {
    builtins: Vec<TransformMeta>,
    folder_plugins: Vec<FolderPlugin>,
}

/// Built-in catalogue metadata plus the folder-discovered plugins,
/// reloadable without disturbing requests in flight.
pub struct Catalog {
    plugins_dir: PathBuf,
    snapshot: RwLock<Arc<Snapshot>>,
}

impl Catalog {
    pub fn load(plugins_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let plugins_dir = plugins_dir.into();
        let snapshot = build_snapshot(&plugins_dir)?;
        Ok(Self { plugins_dir, snapshot: RwLock::new(Arc::new(snapshot)) })
    }

    /// Re-scans `plugins/` from disk and atomically swaps the catalogue.
    pub fn reload(&self) -> StoreResult<()> {
        let fresh = build_snapshot(&self.plugins_dir)?;
        *self.snapshot.write().unwrap() = Arc::new(fresh);
        Ok(())
    }

    pub fn builtins(&self) -> Vec<TransformMeta> {
        self.snapshot.read().unwrap().builtins.clone()
    }

    pub fn builtin_source(&self, id: &str) -> Option<&'static str> {
        crate::builtin_source::source_for(id)
    }

    pub fn folder_plugins(&self) -> Vec<FolderPlugin> {
        self.snapshot.read().unwrap().folder_plugins.clone()
    }

    pub fn find_folder_plugin(&self, id: &str) -> Option<Transform> {
        self.snapshot
            .read()
            .unwrap()
            .folder_plugins
            .iter()
            .find(|p| p.meta.id == id)
            .map(|p| p.transform.clone())
    }

    pub fn categories(&self) -> Vec<CategorySummary> {
        let snapshot = self.snapshot.read().unwrap();
        let mut by_folder: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
        for plugin in &snapshot.folder_plugins {
            *by_folder.entry(plugin.folder.clone()).or_insert(0) += 1;
        }
        by_folder
            .into_iter()
            .map(|(folder, count)| CategorySummary {
                id: folder.clone(),
                name: folder_display_name(&folder),
                folder: Some(folder),
                count,
            })
            .collect()
    }
}

fn folder_display_name(folder: &str) -> String {
    folder
        .split(['-', '_'])
        .filter(|p| !p.is_empty())
        .map(|p| {
            let mut chars = p.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_snapshot(plugins_dir: &std::path::Path) -> StoreResult<Snapshot> {
    Ok(Snapshot {
        builtins: jsdeob_passes::catalog(),
        folder_plugins: folder_plugins::discover(plugins_dir)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_builtins_even_without_a_plugins_dir() {
        let dir = TempDir::new().unwrap();
        let catalog = Catalog::load(dir.path().join("plugins")).unwrap();
        assert!(!catalog.builtins().is_empty());
        assert!(catalog.folder_plugins().is_empty());
    }

    #[test]
    fn reload_picks_up_newly_added_plugin_files() {
        let dir = TempDir::new().unwrap();
        let plugins_dir = dir.path().join("plugins");
        let catalog = Catalog::load(&plugins_dir).unwrap();
        assert!(catalog.folder_plugins().is_empty());

        let category = plugins_dir.join("renaming");
        std::fs::create_dir_all(&category).unwrap();
        std::fs::write(category.join("sample.js"), "function run() {}").unwrap();

        catalog.reload().unwrap();
        assert_eq!(catalog.folder_plugins().len(), 1);
        assert_eq!(catalog.categories().len(), 1);
    }
}
