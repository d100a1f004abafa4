//! Access to project state kept on disk
//!
//! Every read and write of the project settings file and the source
//! registries goes through [`ProjectStore`]. Reads and writes are not
//! locked; concurrent writers can lose updates.

use crate::error::{CoreError, CoreResult};
use crate::project::ProjectSettings;
use crate::registry::SourceRegistry;
use std::path::Path;

/// Handle to the on-disk project state
pub trait ProjectStore: Send + Sync {
    /// Load the project settings file
    fn load_settings(&self, path: &Path) -> CoreResult<ProjectSettings>;

    /// Whether a settings file exists
    fn settings_exist(&self, path: &Path) -> bool;

    /// Load a registry, `None` when the file does not exist
    fn load_registry(&self, path: &Path) -> CoreResult<Option<SourceRegistry>>;

    /// Persist a registry, creating parent folders as needed
    fn save_registry(&self, path: &Path, registry: &SourceRegistry) -> CoreResult<()>;

    /// Delete a registry file
    fn remove_registry(&self, path: &Path) -> CoreResult<()>;
}

/// Filesystem-backed store
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProjectStore;

impl ProjectStore for FsProjectStore {
    fn load_settings(&self, path: &Path) -> CoreResult<ProjectSettings> {
        ProjectSettings::load(path)
    }

    fn settings_exist(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn load_registry(&self, path: &Path) -> CoreResult<Option<SourceRegistry>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
        if content.trim().is_empty() {
            return Ok(Some(SourceRegistry::default()));
        }

        let registry = serde_yaml::from_str::<Option<SourceRegistry>>(&content)
            .map_err(|e| CoreError::YamlParseError {
                path: path.display().to_string(),
                details: e.to_string(),
            })?
            .unwrap_or_default();
        Ok(Some(registry))
    }

    fn save_registry(&self, path: &Path, registry: &SourceRegistry) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::io(parent, e))?;
        }
        let content = serde_yaml::to_string(registry)?;
        std::fs::write(path, content).map_err(|e| CoreError::io(path, e))
    }

    fn remove_registry(&self, path: &Path) -> CoreResult<()> {
        std::fs::remove_file(path).map_err(|e| CoreError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_registry_is_none() {
        let temp = TempDir::new().unwrap();
        let store = FsProjectStore;
        assert!(store
            .load_registry(&temp.path().join("mage_sources.yml"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_save_then_load_registry() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("models").join("mage_sources.yml");
        let store = FsProjectStore;

        let mut registry = SourceRegistry::default();
        registry.add_table_to_source("mage_demo", "etl_users");
        store.save_registry(&path, &registry).unwrap();

        let loaded = store.load_registry(&path).unwrap().unwrap();
        assert_eq!(loaded, registry);

        store.remove_registry(&path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_registry_file_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mage_sources.yml");
        std::fs::write(&path, "").unwrap();

        let loaded = FsProjectStore.load_registry(&path).unwrap().unwrap();
        assert_eq!(loaded, SourceRegistry::default());
    }

    #[test]
    fn test_malformed_registry_names_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mage_sources.yml");
        std::fs::write(&path, "sources: [").unwrap();

        let err = FsProjectStore.load_registry(&path).unwrap_err();
        assert!(err.to_string().contains("mage_sources.yml"));
    }
}
