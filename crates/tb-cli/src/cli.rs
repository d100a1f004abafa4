//! CLI argument definitions using clap derive API

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Tributary - resolve, build and run dbt model blocks
#[derive(Parser, Debug)]
#[command(name = "tb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Repository root containing the `dbt/` folder
    #[arg(short = 'r', long, global = true, default_value = ".")]
    pub repo_path: String,

    /// Pipeline the blocks belong to
    #[arg(long, global = true, default_value = "default")]
    pub pipeline: String,

    /// Override the profile target
    #[arg(short, long, global = true)]
    pub target: Option<String>,

    /// Pipeline global variables as a JSON object
    #[arg(long, global = true)]
    pub vars: Option<String>,

    /// Logical run date (RFC 3339), forwarded as the `execution_date` variable
    #[arg(long, global = true)]
    pub execution_date: Option<DateTime<Utc>>,

    /// dbt executable to spawn
    #[arg(long, global = true, env = "TB_DBT_BIN", default_value = "dbt")]
    pub dbt_bin: String,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved attributes of a model
    Attributes(ModelArgs),

    /// Resolve the models a model references and print their run order
    Deps(DepsArgs),

    /// Show or update the project source registry
    Sources(SourcesArgs),

    /// Show the warehouse adapter a model resolves to
    Adapter(ModelArgs),

    /// Print the dbt command line for a block
    Command(CommandArgs),

    /// Run dbt for a block
    Run(CommandArgs),

    /// Run the tests of a model
    Test(ModelArgs),

    /// Preview model data through a local DuckDB database
    Query(QueryArgs),
}

/// A model addressed by its path under `<repo>/dbt`
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Model path, e.g. `demo/models/users.sql`
    pub model: String,
}

/// Arguments for the deps command
#[derive(Args, Debug)]
pub struct DepsArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Create missing upstream blocks in the pipeline instead of resolving
    /// the whole graph read-only
    #[arg(long)]
    pub persist: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: DepsOutput,
}

/// Deps output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepsOutput {
    /// Table format
    Table,
    /// JSON output
    Json,
}

/// Arguments for the sources command
#[derive(Args, Debug)]
pub struct SourcesArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Register the output table of these upstream loader blocks
    #[arg(long = "register", value_name = "BLOCK_UUID")]
    pub register: Vec<String>,
}

/// Arguments for the command and run commands
#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Model path, e.g. `demo/models/users.sql`
    #[arg(required_unless_present = "content")]
    pub model: Option<String>,

    /// Free-form dbt command content, e.g. `dbt run --select tag:daily`
    #[arg(long, conflicts_with = "model", requires = "project")]
    pub content: Option<String>,

    /// Project name template for free-form content
    #[arg(long)]
    pub project: Option<String>,

    /// Use `dbt build`
    #[arg(long, conflicts_with = "test_model")]
    pub build_model: bool,

    /// Use `dbt test`
    #[arg(long)]
    pub test_model: bool,

    /// Only compile the model
    #[arg(long)]
    pub compile: bool,

    /// Print dbt output to stdout instead of the log
    #[arg(long)]
    pub stdout: bool,
}

/// Arguments for the query command
#[derive(Args, Debug)]
pub struct QueryArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    /// Run the model's compiled SQL instead of reading its table
    #[arg(long, conflicts_with = "sql")]
    pub compiled: bool,

    /// Run this SQL in the model's warehouse context
    #[arg(long)]
    pub sql: Option<String>,

    /// Maximum rows to return
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// DuckDB database file (default: in-memory)
    #[arg(long, default_value = ":memory:")]
    pub database: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
