//! tb-jinja - Jinja templating layer for Tributary
//!
//! Profiles files, profile targets and project names may all be written as
//! templates. This crate renders them with minijinja against pipeline
//! variables and the process environment.

pub mod environment;
pub mod error;
pub mod functions;

pub use environment::{render_with_variables, TemplateEnvironment};
pub use error::{JinjaError, JinjaResult};
pub use functions::json_to_minijinja_value;
