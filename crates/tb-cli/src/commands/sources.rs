//! Sources command implementation

use anyhow::{Context, Result};
use tb_build::{get_source, resolve_attributes, update_model_settings};
use tb_core::{Block, BlockLanguage, BlockType};

use crate::cli::{GlobalArgs, SourcesArgs};
use crate::commands::common::{build_context, model_block};

/// Execute the sources command
pub async fn execute(args: &SourcesArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = model_block(&ctx, global, &args.model.model)?;

    if !args.register.is_empty() {
        let upstream: Vec<Block> = args
            .register
            .iter()
            .map(|uuid| {
                Block::new(
                    uuid.as_str(),
                    BlockType::DataLoader,
                    BlockLanguage::Python,
                    global.pipeline.clone(),
                )
            })
            .collect();
        let added = update_model_settings(&ctx, &block, &upstream, &[], false)
            .context("Failed to update source registry")?;
        println!("Registered {} new table(s)", added);
    }

    let attrs = resolve_attributes(&ctx, &block).context("Failed to resolve model attributes")?;
    match get_source(&ctx, &block).context("Failed to load source registry")? {
        Some(source) => {
            println!("{} ({})", source.name, attrs.sources_full_path.display());
            for table in &source.tables {
                println!("  {}", table.name);
            }
        }
        None => println!(
            "No tables registered under source {} in {}",
            attrs.source_name,
            attrs.sources_full_path.display()
        ),
    }

    Ok(())
}
