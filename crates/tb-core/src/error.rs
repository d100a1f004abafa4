//! Error types for tb-core

use thiserror::Error;

/// Core error type for Tributary
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Project settings file not found
    #[error("[E001] Project settings not found: {path}")]
    SettingsNotFound { path: String },

    /// E002: Failed to parse a YAML document
    #[error("[E002] Failed to parse '{path}': {details}")]
    YamlParseError { path: String, details: String },

    /// E003: Block configuration is missing a required key
    #[error("[E003] Block '{block}' is missing configuration key '{key}'")]
    MissingConfiguration { block: String, key: String },

    /// E004: Model path does not have the expected shape
    #[error("[E004] Invalid model path '{path}': {reason}")]
    InvalidModelPath { path: String, reason: String },

    /// E005: Circular dependency detected
    #[error("[E005] Circular dependency detected: {cycle}")]
    CircularDependency { cycle: String },

    /// E006: Block could not be created by the pipeline
    #[error("[E006] Failed to create block '{uuid}': {reason}")]
    BlockCreation { uuid: String, reason: String },

    /// E007: Unknown warehouse type in a profile
    #[error("[E007] Unknown warehouse type '{found}'")]
    UnknownWarehouse { found: String },

    /// E008: IO error with file path context
    #[error("[E008] Failed to access '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E009: IO error
    #[error("[E009] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E010: YAML serialization error
    #[error("[E010] YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Wrap an IO error with the path that caused it
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        CoreError::IoWithPath {
            path: path.display().to_string(),
            source,
        }
    }
}
