//! Source registry maintenance for a dbt project
//!
//! Upstream blocks of a different type (loaders, Python transformers, ...)
//! publish their output under the project's source name so models can read
//! them with `{{ source(...) }}`.

use crate::attributes::resolve_attributes;
use crate::context::BuildContext;
use crate::error::BuildResult;
use tb_core::{Block, RegistrySource, SourceRegistry};

/// Load the project-level registry, migrating a legacy per-model registry
/// into it when one exists.
///
/// The migration persists the project registry and deletes the legacy file,
/// so repeated calls are no-ops.
pub fn load_sources(ctx: &BuildContext, block: &Block) -> BuildResult<SourceRegistry> {
    let attrs = resolve_attributes(ctx, block)?;
    let project_path = &attrs.sources_full_path;
    let legacy_path = &attrs.sources_full_path_legacy;

    let mut registry = ctx.store.load_registry(project_path)?.unwrap_or_default();

    // A model directly under models/ shares its folder with the project registry
    if legacy_path == project_path {
        return Ok(registry);
    }

    if let Some(legacy) = ctx.store.load_registry(legacy_path)? {
        let added = registry.merge(&legacy);
        ctx.store.save_registry(project_path, &registry)?;
        ctx.store.remove_registry(legacy_path)?;
        log::info!(
            "Migrated {} source table(s) from {} into {}",
            added,
            legacy_path.display(),
            project_path.display()
        );
    }

    Ok(registry)
}

/// Registry entry for the block's own source name
pub fn get_source(ctx: &BuildContext, block: &Block) -> BuildResult<Option<RegistrySource>> {
    let source_name = resolve_attributes(ctx, block)?.source_name;
    Ok(load_sources(ctx, block)?.source(&source_name).cloned())
}

/// Insert `table` under `source`; returns `true` when the registry changed
pub fn add_table_to_source(registry: &mut SourceRegistry, source: &str, table: &str) -> bool {
    registry.add_table_to_source(source, table)
}

/// Register the output table of every upstream block whose type differs
/// from `block`'s.
///
/// When the upstream set shrank and `force_update` is off nothing happens;
/// the registry is never pruned. Returns the number of tables added.
pub fn update_model_settings(
    ctx: &BuildContext,
    block: &Block,
    upstream_blocks: &[Block],
    previous_upstream_blocks: &[Block],
    force_update: bool,
) -> BuildResult<usize> {
    if !force_update && previous_upstream_blocks.len() > upstream_blocks.len() {
        log::debug!(
            "Upstream of '{}' shrank from {} to {} block(s), leaving sources untouched",
            block.uuid,
            previous_upstream_blocks.len(),
            upstream_blocks.len()
        );
        return Ok(0);
    }

    let attrs = resolve_attributes(ctx, block)?;
    let mut added = 0;

    for upstream in upstream_blocks
        .iter()
        .filter(|b| b.block_type != block.block_type)
    {
        let mut registry = load_sources(ctx, block)?;
        let table = upstream.source_table_name();
        if add_table_to_source(&mut registry, &attrs.source_name, &table) {
            ctx.store.save_registry(&attrs.sources_full_path, &registry)?;
            log::info!("Registered source table {}.{}", attrs.source_name, table);
            added += 1;
        }
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use tb_core::{BlockLanguage, BlockType};

    fn loader(uuid: &str) -> Block {
        Block::new(uuid, BlockType::DataLoader, BlockLanguage::Python, "etl")
    }

    #[test]
    fn test_missing_registry_defaults() {
        let fx = Fixture::new();
        let block = fx.model("demo/models/users.sql", "");
        let registry = load_sources(&fx.ctx, &block).unwrap();
        assert_eq!(registry, SourceRegistry::default());
        assert!(!fx.project().join("models/mage_sources.yml").exists());
    }

    #[test]
    fn test_legacy_registry_is_migrated_once() {
        let fx = Fixture::new();
        let legacy = fx.write(
            "demo/models/staging/mage_sources.yml",
            "version: 2\nsources:\n  - name: mage_demo_project\n    tables:\n      - name: etl_load_users\n",
        );
        let block = fx.model("demo/models/staging/users.sql", "");

        let registry = load_sources(&fx.ctx, &block).unwrap();
        assert!(registry.contains("mage_demo_project", "etl_load_users"));
        assert!(!legacy.exists());

        let project_registry = fx.project().join("models/mage_sources.yml");
        assert!(project_registry.exists());

        let before = std::fs::read_to_string(&project_registry).unwrap();
        let again = load_sources(&fx.ctx, &block).unwrap();
        assert_eq!(again, registry);
        assert_eq!(std::fs::read_to_string(&project_registry).unwrap(), before);
    }

    #[test]
    fn test_registry_next_to_model_is_not_migrated() {
        let fx = Fixture::new();
        let path = fx.write(
            "demo/models/mage_sources.yml",
            "sources:\n  - name: raw\n    tables:\n      - name: events\n",
        );
        let block = fx.model("demo/models/users.sql", "");

        let registry = load_sources(&fx.ctx, &block).unwrap();
        assert!(registry.contains("raw", "events"));
        assert!(path.exists());
    }

    #[test]
    fn test_update_registers_cross_type_upstream() {
        let fx = Fixture::new();
        let block = fx.model("demo/models/users.sql", "");
        let upstream = vec![loader("load users"), fx.model("demo/models/orders.sql", "")];

        let added = update_model_settings(&fx.ctx, &block, &upstream, &[], false).unwrap();
        assert_eq!(added, 1);

        let source = get_source(&fx.ctx, &block).unwrap().unwrap();
        assert_eq!(source.name, "mage_demo_project");
        let tables: Vec<&str> = source.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tables, vec!["etl_load_users"]);

        // Re-registering is a no-op
        let added = update_model_settings(&fx.ctx, &block, &upstream, &[], false).unwrap();
        assert_eq!(added, 0);
    }

    #[test]
    fn test_shrinking_upstream_is_ignored_unless_forced() {
        let fx = Fixture::new();
        let block = fx.model("demo/models/users.sql", "");
        let previous = vec![loader("a"), loader("b")];
        let current = vec![loader("a")];

        assert_eq!(
            update_model_settings(&fx.ctx, &block, &current, &previous, false).unwrap(),
            0
        );
        assert!(get_source(&fx.ctx, &block).unwrap().is_none());

        assert_eq!(
            update_model_settings(&fx.ctx, &block, &current, &previous, true).unwrap(),
            1
        );
        let registry = load_sources(&fx.ctx, &block).unwrap();
        assert!(registry.contains("mage_demo_project", "etl_a"));
    }

    #[test]
    fn test_add_table_to_source_is_idempotent() {
        let mut registry = SourceRegistry::default();
        assert!(add_table_to_source(&mut registry, "s", "t"));
        assert!(!add_table_to_source(&mut registry, "s", "t"));
        assert_eq!(registry.pairs().count(), 1);
    }
}
