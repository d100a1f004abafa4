//! Tributary CLI - resolve, build and run dbt model blocks

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::Cli;
use commands::common::ExitCode;
use commands::{adapter, attributes, command, deps, query, run, sources, test};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // The default tracing-log bridge picks up `log` records from the libraries
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn dispatch(cli: &Cli) -> Result<()> {
    match &cli.command {
        cli::Commands::Attributes(args) => attributes::execute(args, &cli.global).await,
        cli::Commands::Deps(args) => deps::execute(args, &cli.global).await,
        cli::Commands::Sources(args) => sources::execute(args, &cli.global).await,
        cli::Commands::Adapter(args) => adapter::execute(args, &cli.global).await,
        cli::Commands::Command(args) => command::execute(args, &cli.global).await,
        cli::Commands::Run(args) => run::execute(args, &cli.global).await,
        cli::Commands::Test(args) => test::execute(args, &cli.global).await,
        cli::Commands::Query(args) => query::execute(args, &cli.global).await,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);
    tracing::debug!(repo = %cli.global.repo_path, pipeline = %cli.global.pipeline, "starting");

    match dispatch(&cli).await {
        Err(err) => match err.downcast_ref::<ExitCode>() {
            Some(code) => std::process::exit(code.0),
            None => Err(err),
        },
        ok => ok,
    }
}
