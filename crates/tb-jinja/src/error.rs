//! Error types for tb-jinja

use thiserror::Error;

/// Template expansion failures
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template failed to parse or evaluate (J001)
    #[error("[J001] Failed to expand template: {0}")]
    RenderError(String),
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

impl From<minijinja::Error> for JinjaError {
    fn from(err: minijinja::Error) -> Self {
        // Profile files span many lines; keep the failing one
        match err.line() {
            Some(line) => JinjaError::RenderError(format!("{} (line {})", err, line)),
            None => JinjaError::RenderError(err.to_string()),
        }
    }
}
