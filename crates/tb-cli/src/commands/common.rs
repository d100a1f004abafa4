//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::fmt;
use tb_build::BuildContext;
use tb_core::names::remove_extension;
use tb_core::{Block, BlockConfiguration, BlockLanguage, BlockType, Variables};
use tb_db::QueryResult;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Returned instead of calling `std::process::exit` so destructors still run.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing to show
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Parse `--vars` into a variables map
pub(crate) fn parse_vars(raw: Option<&str>) -> Result<Variables> {
    let Some(raw) = raw else {
        return Ok(Variables::new());
    };
    match serde_json::from_str::<Value>(raw).context("Invalid JSON in --vars")? {
        Value::Object(map) => Ok(map),
        other => bail!("--vars must be a JSON object, got {}", other),
    }
}

/// Build context from the global arguments
pub(crate) fn build_context(global: &GlobalArgs) -> Result<BuildContext> {
    let variables = parse_vars(global.vars.as_deref())?;
    let ctx = BuildContext::new(&global.repo_path)
        .with_global_variables(variables)
        .with_executable(global.dbt_bin.clone());
    Ok(match global.execution_date {
        Some(ts) => ctx.with_execution_date(ts),
        None => ctx,
    })
}

/// Model block for a path under `<repo>/dbt`, with content read from disk
pub(crate) fn model_block(ctx: &BuildContext, global: &GlobalArgs, model: &str) -> Result<Block> {
    let model = model.trim_start_matches("./");
    let path = ctx.dbt_root().join(model);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;

    let mut configuration = BlockConfiguration::for_file(model);
    if let Some(target) = &global.target {
        configuration.insert("dbt_profile_target", Value::String(target.clone()));
    }

    Ok(Block::new(
        remove_extension(model),
        BlockType::Dbt,
        BlockLanguage::Sql,
        global.pipeline.clone(),
    )
    .with_configuration(configuration)
    .with_content(content))
}

/// Free-form command block running `content` in project `project`
pub(crate) fn command_block(global: &GlobalArgs, content: &str, project: &str) -> Block {
    let mut configuration = BlockConfiguration::default();
    configuration.insert("dbt_project_name", Value::String(project.to_string()));
    if let Some(target) = &global.target {
        configuration.insert("dbt_profile_target", Value::String(target.clone()));
    }

    Block::new(
        "dbt_command",
        BlockType::Dbt,
        BlockLanguage::Yaml,
        global.pipeline.clone(),
    )
    .with_configuration(configuration)
    .with_content(content)
}

/// Print query results as an aligned table
pub(crate) fn print_table(result: &QueryResult) {
    let cells: Vec<Vec<String>> = result
        .rows
        .iter()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    let widths: Vec<usize> = result
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(idx).map(String::len))
                .chain(std::iter::once(name.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header: Vec<String> = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, width)| format!("{:<width$}", name.to_uppercase(), width = width))
        .collect();
    println!("{}", header.join("  "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)));

    for row in &cells {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        println!("{}", line.join("  "));
    }
    println!();
    println!("{} row(s)", result.row_count());
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Quote an argument for display when it contains shell metacharacters
pub(crate) fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vars() {
        assert!(parse_vars(None).unwrap().is_empty());
        let vars = parse_vars(Some(r#"{"env": "prod"}"#)).unwrap();
        assert_eq!(vars["env"], "prod");
        assert!(parse_vars(Some("[1]")).is_err());
        assert!(parse_vars(Some("{")).is_err());
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("--select"), "--select");
        assert_eq!(shell_quote("models/users.sql"), "models/users.sql");
        assert_eq!(shell_quote(r#"{"a":1}"#), r#"'{"a":1}'"#);
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }
}
