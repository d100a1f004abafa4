//! Deps command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use tb_build::{add_blocks_upstream_from_refs, preview_order, RefResolution};
use tb_core::{Block, MemoryPipeline};

use crate::cli::{DepsArgs, DepsOutput, GlobalArgs};
use crate::commands::common::{build_context, model_block};

#[derive(Debug, Serialize)]
struct BlockInfo {
    uuid: String,
    file_path: Option<String>,
    upstream: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DepsReport {
    model: String,
    order: Vec<String>,
    created: Vec<String>,
    blocks: Vec<BlockInfo>,
}

/// Execute the deps command
pub async fn execute(args: &DepsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let mut block = model_block(&ctx, global, &args.model.model)?;
    let mut pipeline = MemoryPipeline::new(global.pipeline.clone());

    let touched = add_blocks_upstream_from_refs(
        &ctx,
        &mut block,
        &mut pipeline,
        RefResolution {
            add_current_block: true,
            read_only: !args.persist,
        },
    )
    .context("Failed to resolve model refs")?;

    let order = preview_order(std::slice::from_ref(&block))
        .context("Failed to order resolved models")?;

    let report = DepsReport {
        model: block.uuid.clone(),
        order,
        created: pipeline.created().to_vec(),
        blocks: touched.iter().map(block_info).collect(),
    };

    match args.output {
        DepsOutput::Table => print_table(&report),
        DepsOutput::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

fn block_info(block: &Block) -> BlockInfo {
    BlockInfo {
        uuid: block.uuid.clone(),
        file_path: block.configuration.file_path().map(String::from),
        upstream: block.upstream_uuids().into_iter().map(String::from).collect(),
    }
}

fn print_table(report: &DepsReport) {
    let width = report
        .order
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(5)
        .max(5);

    println!("{:<4}  {:<width$}  DEPENDS_ON", "STEP", "MODEL", width = width);
    println!("{}", "-".repeat(4 + 2 + width + 2 + 10));

    for (idx, uuid) in report.order.iter().enumerate() {
        let upstream = report
            .blocks
            .iter()
            .find(|b| &b.uuid == uuid)
            .map(|b| b.upstream.join(", "))
            .unwrap_or_default();
        println!(
            "{:<4}  {:<width$}  {}",
            idx + 1,
            uuid,
            if upstream.is_empty() { "-" } else { upstream.as_str() },
            width = width
        );
    }

    if !report.created.is_empty() {
        println!();
        println!("Created {} block(s): {}", report.created.len(), report.created.join(", "));
    }
}
