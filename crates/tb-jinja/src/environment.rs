//! Jinja environment used to expand profiles, targets and project names

use crate::error::{JinjaError, JinjaResult};
use crate::functions::{json_to_minijinja_value, make_env_var_fn, make_variables_fn};
use minijinja::Environment;
use std::sync::Arc;
use tb_core::Variables;

/// Templating environment bound to one set of variables
pub struct TemplateEnvironment<'a> {
    env: Environment<'a>,
}

impl<'a> TemplateEnvironment<'a> {
    /// Create an environment exposing `env_var()`, `variables()` and every
    /// variable as a global.
    pub fn new(vars: &Variables) -> Self {
        let mut env = Environment::new();

        env.add_function("env_var", make_env_var_fn());
        env.add_function("variables", make_variables_fn(Arc::new(vars.clone())));

        for (name, value) in vars {
            // Globals cannot shadow the registered functions
            if name == "env_var" || name == "variables" {
                continue;
            }
            env.add_global(name.clone(), json_to_minijinja_value(value));
        }

        Self { env }
    }

    /// Render a template string
    pub fn render(&self, template: &str) -> JinjaResult<String> {
        self.env
            .render_str(template, ())
            .map_err(JinjaError::from)
    }
}

impl Default for TemplateEnvironment<'_> {
    fn default() -> Self {
        Self::new(&Variables::new())
    }
}

/// Render `template` against `vars` in a throwaway environment
pub fn render_with_variables(template: &str, vars: &Variables) -> JinjaResult<String> {
    TemplateEnvironment::new(vars).render(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vars(value: serde_json::Value) -> Variables {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_render_plain_text() {
        let env = TemplateEnvironment::default();
        assert_eq!(env.render("dev").unwrap(), "dev");
    }

    #[test]
    fn test_render_globals_and_variables_fn() {
        let env = TemplateEnvironment::new(&vars(json!({"target": "prod", "port": 5432})));
        assert_eq!(env.render("{{ target }}").unwrap(), "prod");
        assert_eq!(env.render("{{ variables('port') }}").unwrap(), "5432");
        assert_eq!(
            env.render("{{ variables('missing') or 'fallback' }}").unwrap(),
            "fallback"
        );
    }

    #[test]
    fn test_render_env_var_default() {
        let env = TemplateEnvironment::default();
        let out = env
            .render("{{ env_var('TB_ENVIRONMENT_TEST_UNSET', 'local') }}")
            .unwrap();
        assert_eq!(out, "local");
    }

    #[test]
    fn test_render_error() {
        let env = TemplateEnvironment::default();
        let err = env.render("{{ unclosed").unwrap_err();
        assert!(err.to_string().starts_with("[J001]"));
    }

    #[test]
    fn test_render_with_variables() {
        let out = render_with_variables("{{ project }}_dbt", &vars(json!({"project": "demo"})))
            .unwrap();
        assert_eq!(out, "demo_dbt");
    }
}
