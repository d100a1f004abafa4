//! Resolving `ref()` calls into upstream model blocks

use crate::attributes::resolve_attributes;
use crate::context::BuildContext;
use crate::error::BuildResult;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tb_core::names::{clean_name, remove_extension, split_extension};
use tb_core::{
    extract_refs, extract_sources, Block, BlockConfiguration, BlockDag, CoreError, CoreResult,
    NewBlock, Pipeline,
};

/// How [`add_blocks_upstream_from_refs`] treats the blocks it resolves
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefResolution {
    /// Replace the current block's upstream list with its direct refs and
    /// append the block to the result
    pub add_current_block: bool,
    /// Build a throwaway graph instead of creating pipeline blocks
    pub read_only: bool,
}

/// Resolve the refs of `block` into model blocks.
///
/// Unresolvable refs are skipped with a warning. In persisted mode each ref
/// reuses the pipeline block bound to its file or creates one of the same type
/// and language. In read-only mode refs are resolved recursively into shadow
/// blocks that never reach the pipeline; a ref cycle fails with
/// [`CoreError::CircularDependency`].
///
/// Returns every block touched, in resolution order.
pub fn add_blocks_upstream_from_refs(
    ctx: &BuildContext,
    block: &mut Block,
    pipeline: &mut dyn Pipeline,
    options: RefResolution,
) -> BuildResult<Vec<Block>> {
    let (direct, mut touched) = if options.read_only {
        let root = shadow_uuid(block);
        let mut visiting = vec![root];
        shadow_upstream(ctx, block, &mut visiting)?
    } else {
        let direct = persisted_upstream(ctx, block, pipeline)?;
        (direct.clone(), direct)
    };

    if options.add_current_block {
        block.upstream_blocks = direct;
        touched.push(block.clone());
    }

    Ok(touched)
}

fn persisted_upstream(
    ctx: &BuildContext,
    block: &Block,
    pipeline: &mut dyn Pipeline,
) -> BuildResult<Vec<Block>> {
    let models = models_by_name(ctx, block)?;
    let mut upstream = Vec::new();

    for name in extract_refs(&block.content) {
        let Some(file_path) = resolve_ref(ctx, &models, &name) else {
            continue;
        };
        let uuid = remove_extension(&file_path).to_string();

        let resolved = match pipeline.get_block(&uuid, block.block_type) {
            Some(existing) => existing,
            None => {
                log::info!("Creating block '{}' for dbt model {}", uuid, file_path);
                pipeline.create_block(NewBlock {
                    uuid,
                    block_type: block.block_type,
                    language: block.language,
                    configuration: BlockConfiguration::for_file(file_path),
                })?
            }
        };
        upstream.push(resolved);
    }

    Ok(upstream)
}

/// Returns `(direct upstream, every block touched)`
fn shadow_upstream(
    ctx: &BuildContext,
    block: &Block,
    visiting: &mut Vec<String>,
) -> BuildResult<(Vec<Block>, Vec<Block>)> {
    let models = models_by_name(ctx, block)?;
    let mut direct = Vec::new();
    let mut touched = Vec::new();

    for name in extract_refs(&block.content) {
        let Some(file_path) = resolve_ref(ctx, &models, &name) else {
            continue;
        };
        let uuid = clean_name(remove_extension(&file_path), &['/']);

        if visiting.contains(&uuid) {
            let mut cycle = visiting.clone();
            cycle.push(uuid);
            return Err(CoreError::CircularDependency {
                cycle: cycle.join(" -> "),
            }
            .into());
        }

        let content = std::fs::read_to_string(models[&name].as_path())
            .map_err(|e| CoreError::io(&models[&name], e))?;

        let mut shadow = Block::new(
            uuid.clone(),
            block.block_type,
            block.language,
            block.pipeline_uuid.clone(),
        )
        .with_configuration(BlockConfiguration::for_file(file_path))
        .with_content(content);
        shadow.downstream_blocks = vec![block.uuid.clone()];

        visiting.push(uuid);
        let (shadow_direct, shadow_touched) = shadow_upstream(ctx, &shadow, visiting)?;
        visiting.pop();

        shadow.upstream_blocks = shadow_direct;
        touched.extend(shadow_touched);
        touched.push(shadow.clone());
        direct.push(shadow);
    }

    Ok((direct, touched))
}

fn shadow_uuid(block: &Block) -> String {
    match block.configuration.file_path() {
        Some(fp) => clean_name(remove_extension(fp), &['/']),
        None => block.uuid.clone(),
    }
}

/// Resolve a ref to a path relative to `<repo>/dbt`, warning when missing
fn resolve_ref(
    ctx: &BuildContext,
    models: &BTreeMap<String, PathBuf>,
    name: &str,
) -> Option<String> {
    let Some(path) = models.get(name) else {
        log::warn!("dbt model {} cannot be found", name);
        return None;
    };
    ctx.relative_to_dbt_root(path)
}

/// `.sql` files under the project's models folder keyed by model name.
///
/// Files are visited in sorted order; the first file with a given name wins.
fn models_by_name(ctx: &BuildContext, block: &Block) -> BuildResult<BTreeMap<String, PathBuf>> {
    let attrs = resolve_attributes(ctx, block)?;
    let mut files = Vec::new();
    collect_files(&attrs.models_folder_path, &mut files)?;
    files.sort();

    let mut models = BTreeMap::new();
    for path in files {
        let Some(filename) = path.file_name().and_then(|f| f.to_str()) else {
            continue;
        };
        let Some((stem, "sql")) = split_extension(filename) else {
            continue;
        };
        if models.contains_key(stem) {
            log::debug!("Ignoring duplicate dbt model {}", path.display());
            continue;
        }
        models.insert(stem.to_string(), path.clone());
    }
    Ok(models)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> CoreResult<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    let entries = std::fs::read_dir(dir).map_err(|e| CoreError::io(dir, e))?;
    for entry in entries {
        let path = entry.map_err(|e| CoreError::io(dir, e))?.path();
        if path.is_dir() {
            collect_files(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

/// Upstream blocks of `block` whose output table is declared through
/// `{{ source(<own source name>, <table>) }}` in its content
pub fn upstream_blocks_from_sources(ctx: &BuildContext, block: &Block) -> BuildResult<Vec<Block>> {
    let declared: HashSet<(String, String)> = extract_sources(&block.content).into_iter().collect();
    let source_name = resolve_attributes(ctx, block)?.source_name;

    Ok(block
        .upstream_blocks
        .iter()
        .filter(|b| declared.contains(&(source_name.clone(), b.source_table_name())))
        .cloned()
        .collect())
}

/// Execution order of a resolved graph, dependencies first
pub fn preview_order(blocks: &[Block]) -> CoreResult<Vec<String>> {
    BlockDag::from_blocks(blocks).topological_order()
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
