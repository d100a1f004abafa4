//! Shared settings for every build operation

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tb_core::variables::{merge, timestamp_value};
use tb_core::{FsProjectStore, ProjectStore, Variables};

/// Folder under the repo root holding dbt projects
pub const DBT_FOLDER: &str = "dbt";

/// Default executable for the build tool
pub const DEFAULT_EXECUTABLE: &str = "dbt";

/// Variable carrying the run's logical date
pub const EXECUTION_DATE_KEY: &str = "execution_date";

/// Repo location, project state store, pipeline variables and tool executable
#[derive(Clone)]
pub struct BuildContext {
    pub repo_path: PathBuf,
    pub store: Arc<dyn ProjectStore>,
    /// Pipeline global variables; they win over caller variables
    pub global_variables: Variables,
    pub executable: String,
    /// Logical date of the run, exposed as `execution_date` unless a
    /// variable of that name is already set
    pub execution_date: Option<DateTime<Utc>>,
}

impl BuildContext {
    /// Context on the filesystem store with no variables
    pub fn new(repo_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_path: repo_path.into(),
            store: Arc::new(FsProjectStore),
            global_variables: Variables::new(),
            executable: DEFAULT_EXECUTABLE.to_string(),
            execution_date: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn ProjectStore>) -> Self {
        self.store = store;
        self
    }

    pub fn with_global_variables(mut self, variables: Variables) -> Self {
        self.global_variables = variables;
        self
    }

    pub fn with_executable(mut self, executable: impl Into<String>) -> Self {
        self.executable = executable.into();
        self
    }

    pub fn with_execution_date(mut self, execution_date: DateTime<Utc>) -> Self {
        self.execution_date = Some(execution_date);
        self
    }

    /// `<repo>/dbt`
    pub fn dbt_root(&self) -> PathBuf {
        self.repo_path.join(DBT_FOLDER)
    }

    /// `<repo>/dbt/<project_folder>`
    pub fn project_path(&self, project_folder: &str) -> PathBuf {
        self.dbt_root().join(project_folder)
    }

    /// Caller variables overlaid with the global variables
    pub fn effective_variables(&self, variables: &Variables) -> Variables {
        let mut merged = merge(variables, &self.global_variables);
        if let Some(ts) = self.execution_date {
            merged
                .entry(EXECUTION_DATE_KEY)
                .or_insert_with(|| timestamp_value(ts));
        }
        merged
    }

    /// Path of `path` relative to `<repo>/dbt`, `/`-separated
    pub fn relative_to_dbt_root(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(self.dbt_root()).ok()?;
        let parts: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        Some(parts.join("/"))
    }
}

impl std::fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildContext")
            .field("repo_path", &self.repo_path)
            .field("executable", &self.executable)
            .field("execution_date", &self.execution_date)
            .field("global_variables", &self.global_variables.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_global_variables_win() {
        let mut globals = Variables::new();
        globals.insert("env".to_string(), json!("prod"));
        let ctx = BuildContext::new("/repo").with_global_variables(globals);

        let mut caller = Variables::new();
        caller.insert("env".to_string(), json!("dev"));
        caller.insert("day".to_string(), json!(3));

        let merged = ctx.effective_variables(&caller);
        assert_eq!(merged["env"], "prod");
        assert_eq!(merged["day"], 3);
        assert!(!merged.contains_key(EXECUTION_DATE_KEY));
    }

    #[test]
    fn test_execution_date_is_rfc3339_and_overridable() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let ctx = BuildContext::new("/repo").with_execution_date(ts);

        let merged = ctx.effective_variables(&Variables::new());
        assert_eq!(merged[EXECUTION_DATE_KEY], "2024-05-06T07:08:09Z");

        let mut caller = Variables::new();
        caller.insert(EXECUTION_DATE_KEY.to_string(), json!("2020-01-01"));
        let merged = ctx.effective_variables(&caller);
        assert_eq!(merged[EXECUTION_DATE_KEY], "2020-01-01");
    }
}
