//! Template functions: env_var() and variables(), plus value conversions.

use minijinja::value::Value;
use minijinja::Error;
use std::sync::Arc;
use tb_core::Variables;

/// Create the `variables(name)` function that looks up a pipeline variable.
///
/// Missing variables render as none rather than failing, so optional
/// settings can be written as `{{ variables('schema') or 'public' }}`.
pub(crate) fn make_variables_fn(
    vars: Arc<Variables>,
) -> impl Fn(&str) -> Value + Send + Sync + Clone + 'static {
    move |name: &str| {
        vars.get(name)
            .map(json_to_minijinja_value)
            .unwrap_or_else(|| Value::from(()))
    }
}

/// Create the `env_var(name, default?)` function to read environment variables.
///
/// Usage in templates:
/// ```jinja
/// password: "{{ env_var('POSTGRES_PASSWORD') }}"
/// port: {{ env_var('POSTGRES_PORT', 5432) }}
/// ```
pub(crate) fn make_env_var_fn(
) -> impl Fn(&str, Option<Value>) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |name: &str, default: Option<Value>| match std::env::var(name) {
        Ok(val) => Ok(val),
        Err(_) => {
            if let Some(d) = default {
                Ok(d.to_string())
            } else {
                log::warn!("Environment variable '{}' is not set", name);
                Ok(String::new())
            }
        }
    }
}

/// Template value for a pipeline variable.
///
/// Timestamps are already RFC 3339 strings in [`Variables`], so the JSON
/// shape carries over unchanged.
pub fn json_to_minijinja_value(json: &serde_json::Value) -> Value {
    Value::from_serialize(json)
}

#[cfg(test)]
#[path = "functions_test.rs"]
mod tests;
