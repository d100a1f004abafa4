//! Running model SQL and reading model tables through a warehouse session

use crate::adapter::{get_profile, resolve_adapter};
use crate::attributes::{resolve_attributes, BlockAttributes};
use crate::context::BuildContext;
use crate::error::{BuildError, BuildResult};
use crate::graph::upstream_blocks_from_sources;
use std::collections::HashMap;
use std::path::PathBuf;
use tb_core::project::setting_str;
use tb_core::{Block, BlockType, CoreError, ModelConfig};
use tb_db::{release, AdapterOptions, Connector, QueryResult, UpstreamTable};

/// Output data of upstream blocks, produced elsewhere in the pipeline
pub trait UpstreamOutputs: Send + Sync {
    /// Output of `block`, `None` when it has not produced any
    fn output(&self, block: &Block) -> BuildResult<Option<QueryResult>>;
}

/// Outputs held in memory, keyed by block uuid
#[derive(Debug, Clone, Default)]
pub struct MemoryOutputs {
    outputs: HashMap<String, QueryResult>,
}

impl MemoryOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, block_uuid: impl Into<String>, data: QueryResult) {
        self.outputs.insert(block_uuid.into(), data);
    }
}

impl UpstreamOutputs for MemoryOutputs {
    fn output(&self, block: &Block) -> BuildResult<Option<QueryResult>> {
        Ok(self.outputs.get(&block.uuid).cloned())
    }
}

fn compiled_sql_path(attrs: &BlockAttributes) -> PathBuf {
    let folder = if attrs.snapshot { "run" } else { "compiled" };
    attrs
        .project_full_path
        .join(&attrs.target_path)
        .join(folder)
        .join(&attrs.file_path_with_project_name)
}

/// SQL dbt last wrote for the model: `run/` output for snapshots, `compiled/`
/// output otherwise.
pub fn compiled_query_string(
    ctx: &BuildContext,
    block: &Block,
    error_if_not_found: bool,
) -> BuildResult<Option<String>> {
    let attrs = resolve_attributes(ctx, block)?;
    let path = compiled_sql_path(&attrs);

    if !path.is_file() {
        if error_if_not_found {
            return Err(BuildError::CompiledSqlNotFound {
                path: path.display().to_string(),
            });
        }
        return Ok(None);
    }

    let sql = std::fs::read_to_string(&path).map_err(|e| CoreError::io(&path, e))?;
    Ok(Some(sql))
}

/// Run one query for `block` in a session scoped to the call
pub async fn execute_query(
    ctx: &BuildContext,
    connector: &dyn Connector,
    block: &Block,
    profile_target: Option<&str>,
    query: &str,
    limit: Option<usize>,
    database: Option<&str>,
) -> BuildResult<QueryResult> {
    let options = AdapterOptions {
        database_override: database.map(String::from),
    };
    let resolved = resolve_adapter(ctx, block, profile_target, &options)?;
    let result = resolved
        .adapter
        .load(connector, &resolved.connection, query, limit)
        .await?;
    Ok(result)
}

/// Run the model's compiled SQL
pub async fn query_from_compiled_sql(
    ctx: &BuildContext,
    connector: &dyn Connector,
    block: &Block,
    profile_target: Option<&str>,
    limit: Option<usize>,
) -> BuildResult<QueryResult> {
    let attrs = resolve_attributes(ctx, block)?;
    let query = compiled_query_string(ctx, block, true)?.ok_or_else(|| {
        BuildError::CompiledSqlNotFound {
            path: compiled_sql_path(&attrs).display().to_string(),
        }
    })?;
    execute_query(ctx, connector, block, profile_target, &query, limit, None).await
}

/// Read the model's materialized table.
///
/// The schema starts from the profile's schema and gets `_<override>`
/// appended from the inline `config(schema=...)`, or else from the project
/// model settings. The database comes from the inline config, or else from
/// the project model settings.
pub async fn fetch_model_data(
    ctx: &BuildContext,
    connector: &dyn Connector,
    block: &Block,
    profile_target: Option<&str>,
    limit: Option<usize>,
) -> BuildResult<QueryResult> {
    let attrs = resolve_attributes(ctx, block)?;
    let target_label = profile_target.unwrap_or("<default>");

    let profile = get_profile(ctx, block, profile_target)?.ok_or_else(|| {
        BuildError::configuration(
            format!(
                "Cannot fetch data from model {}, profile target {} not found",
                attrs.model_name, target_label
            ),
            &attrs.profiles_full_path,
        )
    })?;
    let base_schema = profile.schema().ok_or_else(|| {
        BuildError::configuration(
            format!(
                "Cannot fetch data from model {}, no schema found in profile target {}",
                attrs.model_name, target_label
            ),
            &attrs.profiles_full_path,
        )
    })?;

    let config = ModelConfig::parse(&block.content);
    let subfolder = attrs.models_subfolder();
    let model_settings = attrs
        .settings
        .model_settings(&attrs.project_name, subfolder.as_deref());

    let schema_override = config
        .schema()
        .or_else(|| model_settings.and_then(|s| setting_str(s, "schema")));
    let schema = match schema_override {
        Some(suffix) => format!("{}_{}", base_schema, suffix),
        None => base_schema,
    };

    let database = config
        .database()
        .or_else(|| model_settings.and_then(|s| setting_str(s, "database")));

    let query = format!("SELECT * FROM {}.{}", schema, attrs.table_name);
    log::debug!("Fetching model data for '{}': {}", block.uuid, query);

    execute_query(
        ctx,
        connector,
        block,
        profile_target,
        &query,
        limit,
        database,
    )
    .await
}

/// Materialize the output of every upstream block the model reads through
/// `{{ source() }}`.
///
/// Sensor blocks are skipped, as are blocks of the model's own type unless
/// `cache_upstream_models` is set. Tables are written to
/// `<source name>.<pipeline>_<block>`. Returns the number of tables written.
pub async fn create_upstream_tables(
    ctx: &BuildContext,
    connector: &dyn Connector,
    block: &Block,
    profile_target: Option<&str>,
    outputs: &dyn UpstreamOutputs,
    cache_upstream_models: bool,
) -> BuildResult<usize> {
    if block
        .upstream_blocks
        .iter()
        .all(|b| b.block_type == BlockType::Sensor)
    {
        return Ok(0);
    }

    let resolved = resolve_adapter(ctx, block, profile_target, &AdapterOptions::default())?;
    let source_name = resolve_attributes(ctx, block)?.source_name;

    let mut tables = Vec::new();
    for upstream in upstream_blocks_from_sources(ctx, block)? {
        if upstream.block_type == BlockType::Sensor {
            continue;
        }
        if upstream.block_type == block.block_type && !cache_upstream_models {
            continue;
        }
        let Some(data) = outputs.output(&upstream)? else {
            log::warn!(
                "Upstream block '{}' has no output to materialize for '{}'",
                upstream.uuid,
                block.uuid
            );
            continue;
        };
        tables.push(UpstreamTable {
            schema: source_name.clone(),
            table_name: upstream.source_table_name(),
            data,
        });
    }

    if tables.is_empty() {
        return Ok(0);
    }

    let session = resolved
        .adapter
        .scoped_session(connector, &resolved.connection)
        .await?;
    let written = session
        .create_upstream_tables(&tables, resolved.adapter.cascade_on_drop())
        .await;
    release(session).await;
    written?;

    log::info!(
        "Created {} upstream table(s) for '{}'",
        tables.len(),
        block.uuid
    );
    Ok(tables.len())
}

/// Options for [`execute_sql_code`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Rows returned in the preview
    pub limit: Option<usize>,
    pub cache_upstream_models: bool,
}

/// Materialize the model's table from `query` after creating its upstream
/// tables, then return a preview of the result.
pub async fn execute_sql_code(
    ctx: &BuildContext,
    connector: &dyn Connector,
    block: &Block,
    query: &str,
    profile_target: Option<&str>,
    outputs: &dyn UpstreamOutputs,
    options: ExecuteOptions,
) -> BuildResult<QueryResult> {
    create_upstream_tables(
        ctx,
        connector,
        block,
        profile_target,
        outputs,
        options.cache_upstream_models,
    )
    .await?;

    let attrs = resolve_attributes(ctx, block)?;
    let resolved = resolve_adapter(ctx, block, profile_target, &AdapterOptions::default())?;
    let configuration = &resolved.configuration;

    let schema = configuration
        .schema
        .clone()
        .or_else(|| configuration.database.clone())
        .ok_or_else(|| {
            BuildError::configuration(
                format!(
                    "No schema or database to create table {} in",
                    attrs.table_name
                ),
                &attrs.profiles_full_path,
            )
        })?;

    let session = resolved
        .adapter
        .scoped_session(connector, &resolved.connection)
        .await?;

    let result = async {
        session
            .create_table_as(&schema, &attrs.table_name, query, configuration.write_policy)
            .await?;
        session
            .load(
                &format!("SELECT * FROM {}.{}", schema, attrs.table_name),
                options.limit,
            )
            .await
    }
    .await;

    release(session).await;
    Ok(result?)
}

#[cfg(test)]
#[path = "query_test.rs"]
mod tests;
