//! Adapter command implementation

use anyhow::{Context, Result};
use tb_build::resolve_adapter;
use tb_db::AdapterOptions;

use crate::cli::{GlobalArgs, ModelArgs};
use crate::commands::common::{build_context, model_block};

/// Execute the adapter command
pub async fn execute(args: &ModelArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = model_block(&ctx, global, &args.model)?;
    let resolved = resolve_adapter(
        &ctx,
        &block,
        global.target.as_deref(),
        &AdapterOptions::default(),
    )
    .context("Failed to resolve warehouse adapter")?;

    let configuration = &resolved.configuration;
    println!("warehouse     {}", configuration.warehouse);
    println!(
        "database      {}",
        configuration.database.as_deref().unwrap_or("-")
    );
    println!(
        "schema        {}",
        configuration.schema.as_deref().unwrap_or("-")
    );
    println!("write_policy  {:?}", configuration.write_policy);
    // Values are credentials; only keys are shown
    let keys: Vec<&str> = resolved.connection.keys().collect();
    println!("connection    {}", keys.join(", "));

    Ok(())
}
