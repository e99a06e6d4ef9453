//! Project CRUD plus duplicate/import/export (§4.5, §6).

use std::path::PathBuf;

use chrono::Utc;
use jsdeob_ast::model::{Project, Recipe};
use serde::{Deserialize, Serialize};

use crate::blob_store::BlobStore;
use crate::error::StoreResult;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub input_code: String,
    #[serde(default)]
    pub output_code: Option<String>,
    #[serde(default)]
    pub recipe: Recipe,
}

/// The deeper project export/import shape (§6): a full project record
/// minus the store-assigned id and timestamps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPortable {
    pub name: String,
    pub description: Option<String>,
    pub input_code: String,
    pub output_code: Option<String>,
    pub recipe: Recipe,
}

impl From<&Project> for ProjectPortable {
    fn from(p: &Project) -> Self {
        Self {
            name: p.name.clone(),
            description: p.description.clone(),
            input_code: p.input_code.clone(),
            output_code: p.output_code.clone(),
            recipe: p.recipe.clone(),
        }
    }
}

pub struct ProjectStore {
    blobs: BlobStore,
}

impl ProjectStore {
    pub fn open(data_dir: impl Into<PathBuf>) -> StoreResult<Self> {
        Ok(Self { blobs: BlobStore::open(data_dir.into().join("projects"))? })
    }

    pub fn list(&self) -> StoreResult<Vec<Project>> {
        self.blobs.list()
    }

    pub fn get(&self, id: &str) -> StoreResult<Project> {
        self.blobs.get(id)
    }

    pub fn create(&self, input: ProjectInput) -> StoreResult<Project> {
        let mut project = Project::new(input.name, input.description, input.input_code, input.recipe);
        project.output_code = input.output_code;
        self.blobs.put(&project.id, &project)?;
        Ok(project)
    }

    pub fn update(&self, id: &str, input: ProjectInput) -> StoreResult<Project> {
        let existing: Project = self.blobs.get(id)?;
        let updated = Project {
            id: existing.id,
            name: input.name,
            description: input.description,
            input_code: input.input_code,
            output_code: input.output_code,
            recipe: input.recipe,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        self.blobs.put(id, &updated)?;
        Ok(updated)
    }

    pub fn delete(&self, id: &str) -> StoreResult<()> {
        self.blobs.delete(id)
    }

    pub fn duplicate(&self, id: &str) -> StoreResult<Project> {
        let source: Project = self.blobs.get(id)?;
        let mut copy = Project::new(
            format!("{} (copy)", source.name),
            source.description.clone(),
            source.input_code.clone(),
            source.recipe.clone(),
        );
        copy.output_code = source.output_code.clone();
        self.blobs.put(&copy.id, &copy)?;
        Ok(copy)
    }

    pub fn export(&self, id: &str) -> StoreResult<ProjectPortable> {
        let project = self.blobs.get::<Project>(id)?;
        Ok(ProjectPortable::from(&project))
    }

    pub fn import(&self, portable: ProjectPortable) -> StoreResult<Project> {
        let mut project = Project::new(portable.name, portable.description, portable.input_code, portable.recipe);
        project.output_code = portable.output_code;
        self.blobs.put(&project.id, &project)?;
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ProjectStore) {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn creates_lists_and_deletes_a_project() {
        let (_dir, store) = store();
        let input = ProjectInput { name: "Demo".into(), description: None, input_code: "var x=1;".into(), output_code: None, recipe: Recipe::default() };
        let created = store.create(input).unwrap();
        assert_eq!(store.list().unwrap().len(), 1);
        store.delete(&created.id).unwrap();
        assert!(store.get(&created.id).is_err());
    }

    #[test]
    fn duplicate_creates_a_new_id_with_copy_suffix() {
        let (_dir, store) = store();
        let input = ProjectInput { name: "Demo".into(), description: None, input_code: "var x=1;".into(), output_code: None, recipe: Recipe::default() };
        let created = store.create(input).unwrap();
        let dup = store.duplicate(&created.id).unwrap();
        assert_ne!(dup.id, created.id);
        assert_eq!(dup.name, "Demo (copy)");
    }

    #[test]
    fn export_then_import_round_trips_content() {
        let (_dir, store) = store();
        let input = ProjectInput { name: "Demo".into(), description: Some("d".into()), input_code: "var x=1;".into(), output_code: Some("var x=1;".into()), recipe: Recipe::default() };
        let created = store.create(input).unwrap();
        let portable = store.export(&created.id).unwrap();
        let imported = store.import(portable).unwrap();
        assert_ne!(imported.id, created.id);
        assert_eq!(imported.name, created.name);
        assert_eq!(imported.input_code, created.input_code);
    }
}
