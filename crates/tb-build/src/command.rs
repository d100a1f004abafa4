//! Building the dbt command line for a block

use crate::attributes::resolve_attributes;
use crate::content::parse_content;
use crate::context::BuildContext;
use crate::error::BuildResult;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tb_core::variables::{forwardable, merge};
use tb_core::{Block, BlockLanguage, CoreError, RuntimeBlockConfiguration, Variables};
use tb_jinja::render_with_variables;

/// Folder inside a project that holds per-invocation profile copies
pub const TEMP_PROFILES_FOLDER: &str = ".mage_temp_profiles";

/// Pipeline run settings that pick the verb for model blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSettings {
    pub build_model: bool,
    pub test_model: bool,
}

/// What kind of invocation is being built
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommandOptions {
    pub run_settings: RunSettings,
    /// Run the model's tests
    pub run_tests: bool,
    /// Compile only, to preview the model's SQL
    pub test_execution: bool,
}

/// A fully resolved dbt invocation
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    /// Verb such as `run`, `test` or `compile`
    pub command: String,
    pub args: Vec<String>,
    pub profile_target: Option<String>,
    pub profiles_dir: PathBuf,
    pub project_full_path: PathBuf,
}

impl CommandSpec {
    /// Verb followed by the arguments
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.command.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// Build the verb and arguments for running `block`.
///
/// `variables` are overlaid with the context's global variables. The profiles
/// directory is a fresh path for every call; nothing is written there until
/// the temporary profile is created.
pub fn build_command_line_arguments(
    ctx: &BuildContext,
    block: &Block,
    variables: &Variables,
    options: &CommandOptions,
) -> BuildResult<CommandSpec> {
    let mut variables = ctx.effective_variables(variables);
    let runtime = RuntimeBlockConfiguration::from_variables(&variables, &block.uuid);

    let mut args: Vec<String> = runtime
        .as_ref()
        .map(|r| r.flags.clone())
        .unwrap_or_default();

    let (command, project_full_path) = if block.language == BlockLanguage::Sql {
        let attrs = resolve_attributes(ctx, block)?;

        let command = if options.test_execution {
            let compiled = attrs
                .project_full_path
                .join(&attrs.target_path)
                .join("compiled")
                .join(&attrs.file_path);
            remove_stale_compiled(&compiled)?;
            "compile".to_string()
        } else if let Some(verb) = requested_verb(options) {
            verb.to_string()
        } else if attrs.snapshot {
            "snapshot".to_string()
        } else {
            block.configuration.command().unwrap_or("run").to_string()
        };

        let selected = attrs.path_in_project();
        let selected = match &runtime {
            Some(r) => r.decorate(&selected),
            None => selected,
        };
        args.push("--select".to_string());
        args.push(selected);

        (command, attrs.project_full_path)
    } else {
        let template = block.configuration.project_name().ok_or_else(|| {
            CoreError::MissingConfiguration {
                block: block.uuid.clone(),
                key: "dbt_project_name".to_string(),
            }
        })?;
        let project_name = render_with_variables(template, &variables)?;
        let parsed = parse_content(&block.content, &variables)?;

        match parsed.vars {
            Some(Value::Object(content_vars)) => variables = merge(&variables, &content_vars),
            Some(other) => log::warn!(
                "Ignoring --vars of block '{}': expected a JSON object, got {}",
                block.uuid,
                other
            ),
            None => {}
        }
        args.extend(parsed.args);

        let command = match requested_verb(options) {
            Some(verb) => verb.to_string(),
            None => parsed
                .verb
                .as_deref()
                .or(block.configuration.command())
                .unwrap_or("run")
                .to_string(),
        };

        (command, ctx.project_path(project_name.trim()))
    };

    let vars_json = serde_json::to_string(&forwardable(&variables)).map_err(CoreError::from)?;
    args.push("--vars".to_string());
    args.push(vars_json);

    let profiles_dir = project_full_path
        .join(TEMP_PROFILES_FOLDER)
        .join(uuid::Uuid::new_v4().to_string());

    args.push("--project-dir".to_string());
    args.push(project_full_path.display().to_string());
    args.push("--profiles-dir".to_string());
    args.push(profiles_dir.display().to_string());

    let target_template = block.configuration.profile_target().or_else(|| {
        variables
            .get("dbt_profile_target")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    });
    let profile_target = match target_template {
        Some(template) => Some(render_with_variables(template, &variables)?),
        None => None,
    };
    if let Some(target) = &profile_target {
        args.push("--target".to_string());
        args.push(target.clone());
    }

    log::debug!("dbt {} for block '{}'", command, block.uuid);

    Ok(CommandSpec {
        command,
        args,
        profile_target,
        profiles_dir,
        project_full_path,
    })
}

fn requested_verb(options: &CommandOptions) -> Option<&'static str> {
    if options.run_tests {
        Some("test")
    } else if options.run_settings.build_model {
        Some("build")
    } else if options.run_settings.test_model {
        Some("test")
    } else {
        None
    }
}

fn remove_stale_compiled(path: &Path) -> BuildResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed stale compiled SQL at {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CoreError::io(path, e).into()),
    }
}

#[cfg(test)]
#[path = "command_test.rs"]
mod tests;
