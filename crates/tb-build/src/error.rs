//! Error types for tb-build

use tb_core::CoreError;
use tb_db::DbError;
use tb_jinja::JinjaError;
use thiserror::Error;

/// Errors raised while resolving, building or running a block
#[derive(Error, Debug)]
pub enum BuildError {
    /// B001: Profile, target or warehouse cannot be resolved
    #[error("[B001] {message}. Check the profiles file at {path}")]
    Configuration { message: String, path: String },

    /// B002: Project file missing, unreadable or malformed
    #[error("[B002] {0}")]
    File(#[from] CoreError),

    /// B003: Template rendering failed
    #[error("[B003] {0}")]
    Template(#[from] JinjaError),

    /// B004: Warehouse session error
    #[error("[B004] {0}")]
    Warehouse(#[from] DbError),

    /// B005: dbt reported failing tests
    #[error("[B005] dbt test failed with {errors} error(s)")]
    TestFailure { errors: u64 },

    /// B006: The dbt process could not be spawned or read
    #[error("[B006] Failed to run '{command}': {source}")]
    Process {
        command: String,
        source: std::io::Error,
    },

    /// B007: Free-form command content is ambiguous or malformed
    #[error("[B007] Invalid command content: {0}")]
    InvalidCommand(String),

    /// B008: Compiled SQL for a model does not exist yet
    #[error("[B008] Compiled SQL query file at {path} not found")]
    CompiledSqlNotFound { path: String },
}

/// Result type alias for BuildError
pub type BuildResult<T> = Result<T, BuildError>;

impl BuildError {
    pub(crate) fn configuration(message: impl Into<String>, path: &std::path::Path) -> Self {
        BuildError::Configuration {
            message: message.into(),
            path: path.display().to_string(),
        }
    }
}
