//! Loading `profiles.yml` and materializing per-invocation copies of it

use crate::error::BuildResult;
use std::path::{Path, PathBuf};
use tb_core::{CoreError, Variables};
use tb_db::ProfileTarget;
use tb_jinja::TemplateEnvironment;

/// Name of the profiles file inside a project folder
pub const PROFILES_FILE: &str = "profiles.yml";

/// Read `profiles.yml`, render it as a template, then parse it.
///
/// An empty document yields an empty mapping.
pub fn load_profiles_file(path: &Path, variables: &Variables) -> BuildResult<serde_yaml::Mapping> {
    let content = std::fs::read_to_string(path).map_err(|e| CoreError::io(path, e))?;
    let rendered = TemplateEnvironment::new(variables).render(&content)?;

    if rendered.trim().is_empty() {
        return Ok(serde_yaml::Mapping::new());
    }

    let parsed: Option<serde_yaml::Mapping> =
        serde_yaml::from_str(&rendered).map_err(|e| CoreError::YamlParseError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
    Ok(parsed.unwrap_or_default())
}

/// The named profile, `None` when the file does not declare it
pub fn load_profiles(
    profile_name: &str,
    path: &Path,
    variables: &Variables,
) -> BuildResult<Option<serde_yaml::Mapping>> {
    let profiles = load_profiles_file(path, variables)?;
    match profiles.get(profile_name).and_then(|p| p.as_mapping()) {
        Some(profile) => Ok(Some(profile.clone())),
        None => {
            log::warn!(
                "Profile '{}' does not exist in profiles file {}",
                profile_name,
                path.display()
            );
            Ok(None)
        }
    }
}

/// Parameters of one target of the named profile.
///
/// Uses `target` when given, otherwise the profile's declared default.
/// Returns `None` when the profile or the target is missing.
pub fn load_profile(
    profile_name: &str,
    path: &Path,
    target: Option<&str>,
    variables: &Variables,
) -> BuildResult<Option<ProfileTarget>> {
    let Some(profile) = load_profiles(profile_name, path, variables)? else {
        return Ok(None);
    };

    let default_target = profile.get("target").and_then(|t| t.as_str());
    let Some(target) = target.filter(|t| !t.is_empty()).or(default_target) else {
        log::warn!("Profile '{}' has no default target", profile_name);
        return Ok(None);
    };

    let output = profile
        .get("outputs")
        .and_then(|o| o.as_mapping())
        .and_then(|outputs| outputs.get(target))
        .and_then(|t| t.as_mapping());

    match output {
        Some(mapping) => Ok(Some(ProfileTarget::from(mapping.clone()))),
        None => {
            log::warn!(
                "Target '{}' does not exist in profile '{}'",
                target,
                profile_name
            );
            Ok(None)
        }
    }
}

/// Temporary profiles directory, removed when dropped
#[derive(Debug)]
pub struct TempProfileDir {
    path: PathBuf,
}

impl TempProfileDir {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the profiles file inside the directory
    pub fn profiles_path(&self) -> PathBuf {
        self.path.join(PROFILES_FILE)
    }
}

impl Drop for TempProfileDir {
    fn drop(&mut self) {
        if !self.path.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            log::warn!(
                "Error removing temporary profile at {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

/// Write the rendered project profiles into `profiles_dir/profiles.yml`.
///
/// Each invocation gets its own directory, so concurrent runs never share
/// credentials files.
pub fn create_temporary_profile(
    project_full_path: &Path,
    profiles_dir: &Path,
    variables: &Variables,
) -> BuildResult<(serde_yaml::Mapping, TempProfileDir)> {
    let profiles = load_profiles_file(&project_full_path.join(PROFILES_FILE), variables)?;

    std::fs::create_dir_all(profiles_dir).map_err(|e| CoreError::io(profiles_dir, e))?;
    let guard = TempProfileDir {
        path: profiles_dir.to_path_buf(),
    };

    let content = serde_yaml::to_string(&profiles).map_err(CoreError::from)?;
    let target = guard.profiles_path();
    std::fs::write(&target, content).map_err(|e| CoreError::io(&target, e))?;

    log::debug!("Wrote temporary profile to {}", target.display());
    Ok((profiles, guard))
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
