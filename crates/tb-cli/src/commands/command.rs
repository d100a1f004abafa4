//! Command command implementation

use anyhow::{Context, Result};
use tb_build::{build_command_line_arguments, BuildContext, CommandOptions, RunSettings};
use tb_core::Block;

use crate::cli::{CommandArgs, GlobalArgs};
use crate::commands::common::{build_context, command_block, model_block, shell_quote};

/// Block addressed by the arguments: a model file or free-form content
pub(crate) fn target_block(
    ctx: &BuildContext,
    args: &CommandArgs,
    global: &GlobalArgs,
) -> Result<Block> {
    match (&args.model, &args.content) {
        (Some(model), _) => model_block(ctx, global, model),
        (None, Some(content)) => {
            let project = args
                .project
                .as_deref()
                .context("--content requires --project")?;
            Ok(command_block(global, content, project))
        }
        (None, None) => anyhow::bail!("Either a model path or --content is required"),
    }
}

pub(crate) fn command_options(args: &CommandArgs) -> CommandOptions {
    CommandOptions {
        run_settings: RunSettings {
            build_model: args.build_model,
            test_model: args.test_model,
        },
        run_tests: false,
        test_execution: args.compile,
    }
}

/// Execute the command command
pub async fn execute(args: &CommandArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = target_block(&ctx, args, global)?;
    let spec = build_command_line_arguments(
        &ctx,
        &block,
        &ctx.global_variables,
        &command_options(args),
    )
    .context("Failed to build dbt command")?;

    let argv: Vec<String> = std::iter::once(ctx.executable.clone())
        .chain(spec.argv())
        .map(|arg| shell_quote(&arg))
        .collect();
    println!("{}", argv.join(" "));

    Ok(())
}
