//! Project settings parsed from `dbt_project.yml`

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Name of the project settings file inside a project folder
pub const PROJECT_SETTINGS_FILE: &str = "dbt_project.yml";

/// The subset of `dbt_project.yml` this crate reads
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectSettings {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub profile: Option<String>,

    /// Folders whose models are built as snapshots
    #[serde(default, rename = "snapshot-paths")]
    pub snapshot_paths: Option<Vec<String>>,

    /// Output directory of the build tool
    #[serde(default, rename = "target-path")]
    pub target_path: Option<String>,

    /// Per-project, per-folder model settings (`models: {<project>: {<folder>: {...}}}`)
    #[serde(default)]
    pub models: Option<serde_yaml::Mapping>,
}

fn default_target_path() -> &'static str {
    "target"
}

impl ProjectSettings {
    /// Load and parse the settings file
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::SettingsNotFound {
                    path: path.display().to_string(),
                }
            } else {
                CoreError::io(path, e)
            }
        })?;
        Self::parse(&content, path)
    }

    /// Parse settings text; `path` is only used for error messages
    pub fn parse(content: &str, path: &Path) -> CoreResult<Self> {
        // An empty settings file is valid YAML null
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| CoreError::YamlParseError {
            path: path.display().to_string(),
            details: e.to_string(),
        })
    }

    /// Project name, falling back to the folder name
    pub fn project_name(&self, folder_name: &str) -> String {
        self.name
            .clone()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| folder_name.to_string())
    }

    /// Profile name, falling back to the project name
    pub fn profile_name(&self, folder_name: &str) -> String {
        self.profile
            .clone()
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.project_name(folder_name))
    }

    pub fn target_path(&self) -> &str {
        self.target_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .unwrap_or(default_target_path())
    }

    pub fn is_snapshot_folder(&self, folder: &str) -> bool {
        self.snapshot_paths
            .as_deref()
            .unwrap_or_default()
            .iter()
            .any(|p| p == folder)
    }

    /// Model settings for a project, narrowed to a models subfolder when that
    /// subfolder has its own entry.
    pub fn model_settings(
        &self,
        project_name: &str,
        subfolder: Option<&str>,
    ) -> Option<&serde_yaml::Mapping> {
        let project = self.models.as_ref()?.get(project_name)?.as_mapping()?;

        if let Some(folder) = subfolder {
            if let Some(folder_settings) = project.get(folder).and_then(|v| v.as_mapping()) {
                return Some(folder_settings);
            }
        }

        Some(project)
    }
}

/// Read a setting that may be written with or without the `+` prefix
pub fn setting_str<'a>(settings: &'a serde_yaml::Mapping, key: &str) -> Option<&'a str> {
    settings
        .get(key)
        .or_else(|| settings.get(format!("+{}", key)))
        .and_then(|v| v.as_str())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn parse(yaml: &str) -> ProjectSettings {
        ProjectSettings::parse(yaml, &PathBuf::from("dbt_project.yml")).unwrap()
    }

    #[test]
    fn test_names_fall_back_to_folder() {
        let settings = parse("version: 2\n");
        assert_eq!(settings.project_name("demo"), "demo");
        assert_eq!(settings.profile_name("demo"), "demo");

        let settings = parse("name: shop\n");
        assert_eq!(settings.project_name("demo"), "shop");
        assert_eq!(settings.profile_name("demo"), "shop");

        let settings = parse("name: shop\nprofile: warehouse\n");
        assert_eq!(settings.profile_name("demo"), "warehouse");
    }

    #[test]
    fn test_target_path_and_snapshots() {
        let settings = parse("name: shop\nsnapshot-paths: [snapshots]\n");
        assert_eq!(settings.target_path(), "target");
        assert!(settings.is_snapshot_folder("snapshots"));
        assert!(!settings.is_snapshot_folder("models"));

        let settings = parse("target-path: build\n");
        assert_eq!(settings.target_path(), "build");
    }

    #[test]
    fn test_null_snapshot_paths() {
        let settings = parse("name: shop\nsnapshot-paths: null\ntarget-path:\n");
        assert!(settings.snapshot_paths.is_none());
        assert!(!settings.is_snapshot_folder("snapshots"));
        assert_eq!(settings.target_path(), "target");
    }

    #[test]
    fn test_model_settings_prefers_subfolder() {
        let settings = parse(
            r#"
name: shop
models:
  shop:
    +schema: analytics
    staging:
      +schema: stg
"#,
        );

        let staging = settings.model_settings("shop", Some("staging")).unwrap();
        assert_eq!(setting_str(staging, "schema"), Some("stg"));

        let marts = settings.model_settings("shop", Some("marts")).unwrap();
        assert_eq!(setting_str(marts, "schema"), Some("analytics"));

        assert!(settings.model_settings("other", None).is_none());
    }

    #[test]
    fn test_invalid_yaml_names_path() {
        let err = ProjectSettings::parse("name: [", &PathBuf::from("/p/dbt_project.yml"))
            .unwrap_err();
        assert!(err.to_string().contains("/p/dbt_project.yml"));
    }

    #[test]
    fn test_missing_file() {
        let err = ProjectSettings::load(&PathBuf::from("/nonexistent/dbt_project.yml"))
            .unwrap_err();
        assert!(matches!(err, CoreError::SettingsNotFound { .. }));
    }
}
