//! Library & Storage (§4.5): the built-in/folder-plugin catalogue and the
//! saved plugin/script/project blob stores, all rooted under a single
//! configurable base directory.

pub mod blob_store;
pub mod builtin_source;
pub mod catalog;
pub mod error;
pub mod folder_plugins;
pub mod plugins;
pub mod projects;
pub mod scripts;

pub use catalog::{Catalog, CategorySummary};
pub use error::{StoreError, StoreResult};
pub use plugins::{PluginInput, PluginPortable, PluginStore};
pub use projects::{ProjectInput, ProjectPortable, ProjectStore};
pub use scripts::{ScriptInput, ScriptStore};

use std::path::{Path, PathBuf};

/// Everything the server needs to serve storage + catalogue endpoints,
/// rooted at a configurable base directory (`data/`, `plugins/`).
pub struct Library {
    pub catalog: Catalog,
    pub plugins: PluginStore,
    pub scripts: ScriptStore,
    pub projects: ProjectStore,
}

impl Library {
    pub fn open(base_dir: impl AsRef<Path>) -> StoreResult<Self> {
        let base_dir: PathBuf = base_dir.as_ref().to_path_buf();
        let data_dir = base_dir.join("data");
        let plugins_dir = base_dir.join("plugins");
        Ok(Self {
            catalog: Catalog::load(&plugins_dir)?,
            plugins: PluginStore::open(&data_dir, &plugins_dir)?,
            scripts: ScriptStore::open(&data_dir)?,
            projects: ProjectStore::open(&data_dir)?,
        })
    }
}
