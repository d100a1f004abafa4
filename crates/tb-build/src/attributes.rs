//! Path, naming and profile facts derived from a model block
//!
//! Attributes are recomputed on every call and never cached: they depend on
//! the block configuration and on project files that can change between runs.

use crate::context::BuildContext;
use crate::error::BuildResult;
use crate::profile::{load_profile, PROFILES_FILE};
use std::path::PathBuf;
use std::str::FromStr;
use tb_core::names::split_extension;
use tb_core::{
    Block, CoreError, CoreResult, ModelConfig, ProjectSettings, WarehouseType,
    PROJECT_SETTINGS_FILE, REGISTRY_FILE,
};
use tb_db::ProfileTarget;

/// Everything known about a file-backed model
#[derive(Debug, Clone)]
pub struct BlockAttributes {
    /// Model path relative to `<repo>/dbt`, e.g. `demo/models/users.sql`
    pub file_path: String,
    pub project_folder_name: String,
    /// Folder directly under the project, e.g. `models` or `snapshots`
    pub first_folder_name: Option<String>,
    pub filename: String,
    pub model_name: String,
    pub file_extension: Option<String>,
    pub table_name: String,
    /// `database` from inline `config()`
    pub database: Option<String>,
    pub project_name: String,
    pub profile_name: String,
    pub source_name: String,
    pub snapshot: bool,
    pub target_path: String,
    /// `file_path` with the project folder replaced by the project name
    pub file_path_with_project_name: String,
    pub full_path: PathBuf,
    pub project_full_path: PathBuf,
    pub project_settings_path: PathBuf,
    pub models_folder_path: PathBuf,
    pub sources_full_path: PathBuf,
    pub sources_full_path_legacy: PathBuf,
    pub profiles_full_path: PathBuf,
    pub settings: ProjectSettings,
    pub profile: Option<ProfileTarget>,
}

impl BlockAttributes {
    /// Model path relative to the project folder, e.g. `models/users.sql`
    pub fn path_in_project(&self) -> String {
        self.file_path
            .split_once('/')
            .map(|(_, rest)| rest.to_string())
            .unwrap_or_default()
    }

    /// First folder under `models/` when the model is nested below one
    pub fn models_subfolder(&self) -> Option<String> {
        let relative = self.full_path.strip_prefix(&self.models_folder_path).ok()?;
        let parts: Vec<_> = relative.components().collect();
        if parts.len() >= 2 {
            Some(parts[0].as_os_str().to_string_lossy().into_owned())
        } else {
            None
        }
    }
}

/// Resolve the attributes of a file-backed block.
///
/// Fails when the project settings file or the profiles file cannot be read
/// or parsed.
pub fn resolve_attributes(ctx: &BuildContext, block: &Block) -> BuildResult<BlockAttributes> {
    let file_path = block.require_file_path()?.to_string();
    let parts: Vec<&str> = file_path.split('/').filter(|p| !p.is_empty()).collect();
    if parts.len() < 2 {
        return Err(CoreError::InvalidModelPath {
            path: file_path.clone(),
            reason: "expected <project>/<folder>/<model>.sql".to_string(),
        }
        .into());
    }

    let project_folder_name = parts[0].to_string();
    let filename = parts[parts.len() - 1].to_string();
    let first_folder_name = (parts.len() >= 3).then(|| parts[1].to_string());

    let (model_name, file_extension) = match split_extension(&filename) {
        Some((stem, ext)) => (stem.to_string(), Some(ext.to_string())),
        None => (filename.clone(), None),
    };

    let config = ModelConfig::parse(&block.content);
    let table_name = config.alias().unwrap_or(&model_name).to_string();
    let database = config.database().map(String::from);

    let project_full_path = ctx.project_path(&project_folder_name);
    let full_path = ctx.dbt_root().join(&file_path);
    let project_settings_path = project_full_path.join(PROJECT_SETTINGS_FILE);
    let settings = ctx.store.load_settings(&project_settings_path)?;

    let project_name = settings.project_name(&project_folder_name);
    let profile_name = settings.profile_name(&project_folder_name);

    let models_folder_path = project_full_path.join("models");
    let sources_full_path = models_folder_path.join(REGISTRY_FILE);
    let sources_full_path_legacy = full_path
        .parent()
        .map(|p| p.join(REGISTRY_FILE))
        .unwrap_or_else(|| project_full_path.join(REGISTRY_FILE));

    let profiles_full_path = project_full_path.join(PROFILES_FILE);
    let profile = load_profile(
        &profile_name,
        &profiles_full_path,
        block.configuration.profile_target(),
        &ctx.global_variables,
    )?;

    let source_name = profile
        .as_ref()
        .and_then(|p| {
            let warehouse = WarehouseType::from_str(&p.type_name()?).ok()?;
            if warehouse.sources_live_in_profile_schema() {
                p.get_string("schema")
            } else {
                None
            }
        })
        .unwrap_or_else(|| format!("mage_{}", project_name));

    let snapshot = first_folder_name
        .as_deref()
        .is_some_and(|folder| settings.is_snapshot_folder(folder));

    let file_path_with_project_name = std::iter::once(project_name.as_str())
        .chain(parts[1..].iter().copied())
        .collect::<Vec<_>>()
        .join("/");

    Ok(BlockAttributes {
        target_path: settings.target_path().to_string(),
        file_path,
        project_folder_name,
        first_folder_name,
        filename,
        model_name,
        file_extension,
        table_name,
        database,
        project_name,
        profile_name,
        source_name,
        snapshot,
        file_path_with_project_name,
        full_path,
        project_full_path,
        project_settings_path,
        models_folder_path,
        sources_full_path,
        sources_full_path_legacy,
        profiles_full_path,
        settings,
        profile,
    })
}

/// Project and profile names of a project folder.
///
/// Both fall back to the folder name when the project has no settings file.
pub fn project_names(ctx: &BuildContext, project_folder: &str) -> CoreResult<(String, String)> {
    let settings_path = ctx.project_path(project_folder).join(PROJECT_SETTINGS_FILE);
    if !ctx.store.settings_exist(&settings_path) {
        return Ok((project_folder.to_string(), project_folder.to_string()));
    }

    let settings = ctx.store.load_settings(&settings_path)?;
    Ok((
        settings.project_name(project_folder),
        settings.profile_name(project_folder),
    ))
}

#[cfg(test)]
#[path = "attributes_test.rs"]
mod tests;
