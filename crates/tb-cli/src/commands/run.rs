//! Run command implementation

use anyhow::{Context, Result};
use tb_build::{execute_block_command, LogSink, OutputSink, StdoutSink};

use crate::cli::{CommandArgs, GlobalArgs};
use crate::commands::command::{command_options, target_block};
use crate::commands::common::{build_context, ExitCode};

/// Execute the run command
pub async fn execute(args: &CommandArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = target_block(&ctx, args, global)?;

    let mut log_sink;
    let mut stdout_sink;
    let sink: &mut dyn OutputSink = if args.stdout {
        stdout_sink = StdoutSink;
        &mut stdout_sink
    } else {
        log_sink = LogSink::new()
            .with_tag("pipeline", global.pipeline.clone())
            .with_tag("block", block.uuid.clone());
        &mut log_sink
    };

    let outcome = execute_block_command(
        &ctx,
        &block,
        &ctx.global_variables,
        &command_options(args),
        sink,
    )
    .await
    .context("Failed to run dbt")?;

    if outcome.success() {
        println!("dbt finished for {}", block.uuid);
        return Ok(());
    }

    eprintln!(
        "dbt failed for {} (exit code {:?}, {} error(s))",
        block.uuid, outcome.exit_code, outcome.errors
    );
    Err(ExitCode(1).into())
}
