//! Query command implementation

use anyhow::{Context, Result};
use tb_build::{execute_query, fetch_model_data, query_from_compiled_sql};
use tb_db::DuckDbConnector;

use crate::cli::{GlobalArgs, QueryArgs};
use crate::commands::common::{build_context, model_block, print_table};

/// Execute the query command
pub async fn execute(args: &QueryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = build_context(global)?;
    let block = model_block(&ctx, global, &args.model.model)?;
    let connector = DuckDbConnector::new(&args.database).context("Failed to open database")?;
    let target = global.target.as_deref();

    let result = if args.compiled {
        query_from_compiled_sql(&ctx, &connector, &block, target, args.limit).await
    } else if let Some(sql) = &args.sql {
        execute_query(&ctx, &connector, &block, target, sql, args.limit, None).await
    } else {
        fetch_model_data(&ctx, &connector, &block, target, args.limit).await
    }
    .context("Query failed")?;

    print_table(&result);
    Ok(())
}
