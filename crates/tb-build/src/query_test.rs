use super::*;
use crate::test_support::{Fixture, PROJECT_SETTINGS};
use serde_json::json;
use tb_core::{BlockLanguage, WarehouseType};
use tb_db::{ConnectionConfig, DuckDbConnector, WritePolicy};

async fn seed(connector: &DuckDbConnector, schema: &str, table: &str, select: &str) {
    let session = connector
        .connect(WarehouseType::Postgres, &ConnectionConfig::new())
        .await
        .unwrap();
    session
        .create_table_as(schema, table, select, WritePolicy::Replace)
        .await
        .unwrap();
    release(session).await;
}

fn users_data() -> QueryResult {
    QueryResult::new(
        vec!["id".to_string(), "name".to_string()],
        vec![
            vec![json!(1), json!("ada")],
            vec![json!(2), json!("grace")],
            vec![json!(3), json!("linus")],
        ],
    )
}

#[test]
fn test_compiled_query_string_locations() {
    let fx = Fixture::new();
    let model = fx.model("demo/models/users.sql", "");
    assert!(compiled_query_string(&fx.ctx, &model, false)
        .unwrap()
        .is_none());
    let err = compiled_query_string(&fx.ctx, &model, true).unwrap_err();
    assert!(matches!(err, BuildError::CompiledSqlNotFound { .. }));

    fx.write(
        "demo/target/compiled/demo_project/models/users.sql",
        "select 1 as id",
    );
    assert_eq!(
        compiled_query_string(&fx.ctx, &model, true).unwrap().as_deref(),
        Some("select 1 as id")
    );

    fx.write(
        "demo/target/run/demo_project/snapshots/history.sql",
        "select 2 as id",
    );
    let snapshot = fx.model("demo/snapshots/history.sql", "");
    assert_eq!(
        compiled_query_string(&fx.ctx, &snapshot, false)
            .unwrap()
            .as_deref(),
        Some("select 2 as id")
    );
}

#[tokio::test]
async fn test_query_from_compiled_sql() {
    let fx = Fixture::new();
    fx.write(
        "demo/target/compiled/demo_project/models/users.sql",
        "select * from range(10) t(id)",
    );
    let connector = DuckDbConnector::in_memory().unwrap();
    let model = fx.model("demo/models/users.sql", "");

    let result = query_from_compiled_sql(&fx.ctx, &connector, &model, None, Some(4))
        .await
        .unwrap();
    assert_eq!(result.row_count(), 4);
    assert_eq!(result.columns, vec!["id"]);
}

#[tokio::test]
async fn test_fetch_model_data_appends_project_schema() {
    let fx = Fixture::new();
    let connector = DuckDbConnector::in_memory().unwrap();
    seed(&connector, "public_core", "users", "select 1 as id").await;

    let model = fx.model("demo/models/users.sql", "select 1 as id");
    let result = fetch_model_data(&fx.ctx, &connector, &model, None, None)
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![json!(1)]]);
}

#[tokio::test]
async fn test_fetch_model_data_subfolder_and_inline_config() {
    let fx = Fixture::new();
    let connector = DuckDbConnector::in_memory().unwrap();
    seed(&connector, "public_marts", "revenue", "select 10 as total").await;
    seed(&connector, "public_adhoc", "renamed", "select 20 as total").await;

    let marts = fx.model("demo/models/marts/revenue.sql", "");
    let result = fetch_model_data(&fx.ctx, &connector, &marts, None, None)
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![json!(10)]]);

    // Inline config wins over the folder settings
    let inline = fx.model(
        "demo/models/marts/revenue.sql",
        r#"{{ config(schema="adhoc", alias="renamed") }} select 20 as total"#,
    );
    let result = fetch_model_data(&fx.ctx, &connector, &inline, None, None)
        .await
        .unwrap();
    assert_eq!(result.rows, vec![vec![json!(20)]]);
}

#[tokio::test]
async fn test_fetch_model_data_without_schema_fails() {
    let fx = Fixture::with_files(
        PROJECT_SETTINGS,
        "demo:\n  target: dev\n  outputs:\n    dev:\n      type: postgres\n      dbname: analytics\n",
    );
    let connector = DuckDbConnector::in_memory().unwrap();
    let model = fx.model("demo/models/users.sql", "");

    let err = fetch_model_data(&fx.ctx, &connector, &model, None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, BuildError::Configuration { .. }));
    assert!(err.to_string().contains("no schema"));
}

#[tokio::test]
async fn test_execute_sql_code_materializes_upstream_sources() {
    let fx = Fixture::new();
    let connector = DuckDbConnector::in_memory().unwrap();

    let loader = Block::new("load users", BlockType::DataLoader, BlockLanguage::Python, "etl");
    let sensor = Block::new("wait", BlockType::Sensor, BlockLanguage::Python, "etl");
    let undeclared = Block::new("other", BlockType::DataLoader, BlockLanguage::Python, "etl");

    let mut outputs = MemoryOutputs::new();
    outputs.insert("load users", users_data());
    outputs.insert("other", users_data());

    let mut block = fx.model(
        "demo/models/users.sql",
        "select * from {{ source('mage_demo_project', 'etl_load_users') }}",
    );
    block.upstream_blocks = vec![loader, sensor, undeclared];

    let preview = execute_sql_code(
        &fx.ctx,
        &connector,
        &block,
        "select id, name from mage_demo_project.etl_load_users where id > 1",
        None,
        &outputs,
        ExecuteOptions {
            limit: Some(1),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(preview.columns, vec!["id", "name"]);
    assert_eq!(preview.row_count(), 1);
    assert_eq!(block.upstream_blocks.len(), 3);

    let full = execute_query(
        &fx.ctx,
        &connector,
        &block,
        None,
        "select count(*) as n from public.users",
        None,
        None,
    )
    .await
    .unwrap();
    assert_eq!(full.rows, vec![vec![json!(2)]]);

    let missing = execute_query(
        &fx.ctx,
        &connector,
        &block,
        None,
        "select * from mage_demo_project.etl_other",
        None,
        None,
    )
    .await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn test_same_type_upstream_needs_caching() {
    let fx = Fixture::new();
    let connector = DuckDbConnector::in_memory().unwrap();

    let upstream = fx.model("demo/models/stg_users.sql", "");
    let mut outputs = MemoryOutputs::new();
    outputs.insert(upstream.uuid.clone(), users_data());

    let table = upstream.source_table_name();
    let mut block = fx.model(
        "demo/models/users.sql",
        &format!("select * from {{{{ source('mage_demo_project', '{}') }}}}", table),
    );
    block.upstream_blocks = vec![upstream];

    let written =
        create_upstream_tables(&fx.ctx, &connector, &block, None, &outputs, false)
            .await
            .unwrap();
    assert_eq!(written, 0);

    let written = create_upstream_tables(&fx.ctx, &connector, &block, None, &outputs, true)
        .await
        .unwrap();
    assert_eq!(written, 1);
}

#[tokio::test]
async fn test_sensor_only_upstream_is_a_no_op() {
    let fx = Fixture::new();
    let connector = DuckDbConnector::in_memory().unwrap();
    let mut block = fx.model("demo/models/users.sql", "");
    block.upstream_blocks = vec![Block::new(
        "wait",
        BlockType::Sensor,
        BlockLanguage::Python,
        "etl",
    )];

    let written = create_upstream_tables(
        &fx.ctx,
        &connector,
        &block,
        None,
        &MemoryOutputs::new(),
        false,
    )
    .await
    .unwrap();
    assert_eq!(written, 0);
}
