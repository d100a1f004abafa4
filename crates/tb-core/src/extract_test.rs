use super::*;

#[test]
fn test_extract_refs_keeps_order_and_duplicates() {
    let sql = r#"
SELECT * FROM {{ ref('users') }}
JOIN {{ref("orders")}} USING (user_id)
UNION ALL SELECT * FROM {{   ref('users')   }}
"#;

    assert_eq!(extract_refs(sql), vec!["users", "orders", "users"]);
}

#[test]
fn test_extract_refs_ignores_other_macros() {
    let sql = "SELECT * FROM {{ source('raw', 'users') }} WHERE {{ var('x') }}";
    assert!(extract_refs(sql).is_empty());
}

#[test]
fn test_extract_sources_tolerates_whitespace() {
    let sql = r#"
SELECT * FROM {{ source('mage_demo', 'etl_load_users') }}
JOIN {{source("mage_demo","etl_orders")}}
JOIN {{    source( 'raw' ,   'events' )    }}
"#;

    assert_eq!(
        extract_sources(sql),
        vec![
            ("mage_demo".to_string(), "etl_load_users".to_string()),
            ("mage_demo".to_string(), "etl_orders".to_string()),
            ("raw".to_string(), "events".to_string()),
        ]
    );
}

#[test]
fn test_model_config_alias_and_database() {
    let sql = r#"{{ config(alias="custom_tbl", database="db1") }}
SELECT 1"#;

    let config = ModelConfig::parse(sql);
    assert_eq!(config.alias(), Some("custom_tbl"));
    assert_eq!(config.database(), Some("db1"));
    assert_eq!(config.schema(), None);
}

#[test]
fn test_model_config_last_write_wins() {
    let sql = r#"
{{ config(schema='staging', materialized='table') }}
{{ config(schema='marts') }}
"#;

    let config = ModelConfig::parse(sql);
    assert_eq!(config.schema(), Some("marts"));
    assert_eq!(config.get("materialized"), Some("table"));
}

#[test]
fn test_model_config_skips_malformed_pairs() {
    let config = ModelConfig::parse("{{ config(alias, schema = raw ) }}");
    assert_eq!(config.get("alias"), None);
    assert_eq!(config.schema(), Some("raw"));
}

#[test]
fn test_model_config_absent() {
    assert!(ModelConfig::parse("SELECT 1").is_empty());
}
