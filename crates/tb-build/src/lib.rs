//! tb-build - dbt block executor for Tributary
//!
//! Resolves what a dbt model block needs before it can run: its attributes,
//! the upstream models it references, the sources it reads and the warehouse
//! its profile points to. It then builds the dbt command line, runs dbt and
//! aggregates the reported errors, and can materialize or preview model
//! tables through a warehouse session.

pub mod adapter;
pub mod attributes;
pub mod command;
pub mod content;
pub mod context;
pub mod error;
pub mod graph;
pub mod profile;
pub mod query;
pub mod run;
pub mod sources;

#[cfg(test)]
mod test_support;

pub use adapter::{get_profile, resolve_adapter, ResolvedAdapter};
pub use attributes::{project_names, resolve_attributes, BlockAttributes};
pub use command::{build_command_line_arguments, CommandOptions, CommandSpec, RunSettings};
pub use content::{parse_content, ParsedContent};
pub use context::BuildContext;
pub use error::{BuildError, BuildResult};
pub use graph::{
    add_blocks_upstream_from_refs, preview_order, upstream_blocks_from_sources, RefResolution,
};
pub use profile::{
    create_temporary_profile, load_profile, load_profiles, load_profiles_file, TempProfileDir,
};
pub use query::{
    compiled_query_string, create_upstream_tables, execute_query, execute_sql_code,
    fetch_model_data, query_from_compiled_sql, ExecuteOptions, MemoryOutputs, UpstreamOutputs,
};
pub use run::{
    count_errors, execute_block_command, run_command, run_dbt_tests, CollectingSink,
    CommandOutcome, LogSink, OutputSink, StdoutSink,
};
pub use sources::{add_table_to_source, get_source, load_sources, update_model_settings};
