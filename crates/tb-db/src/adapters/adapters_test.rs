use super::*;
use crate::config::AdapterOptions;
use crate::error::DbError;
use crate::profile::ProfileTarget;

fn profile(yaml: &str) -> ProfileTarget {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_every_warehouse_has_an_adapter() {
    for warehouse in WarehouseType::ALL {
        assert_eq!(adapter_for(warehouse).warehouse(), warehouse);
    }
}

#[test]
fn test_postgres_passthrough() {
    let p = profile(
        "type: postgres\ndbname: analytics\nhost: localhost\npassword: pw\nport: 5432\nschema: public\nuser: me\n",
    );
    let adapter = adapter_for(WarehouseType::Postgres);
    let config = adapter.build_connection_config(&p).unwrap();
    assert_eq!(config.get("POSTGRES_DBNAME"), Some("analytics"));
    assert_eq!(config.get("POSTGRES_PORT"), Some("5432"));
    assert_eq!(config.get("POSTGRES_USER"), Some("me"));

    let canonical = adapter.canonical_configuration(&p, &AdapterOptions::default());
    assert_eq!(canonical.database.as_deref(), Some("analytics"));
    assert_eq!(canonical.schema.as_deref(), Some("public"));
    assert!(adapter.cascade_on_drop());
}

#[test]
fn test_bigquery_database_override() {
    let p = profile("type: bigquery\nkeyfile: /k.json\nproject: proj\ndataset: ds\n");
    let adapter = adapter_for(WarehouseType::BigQuery);

    let config = adapter.build_connection_config(&p).unwrap();
    assert_eq!(config.get("GOOGLE_SERVICE_ACC_KEY_FILEPATH"), Some("/k.json"));
    assert_eq!(config.len(), 1);

    let default = adapter.canonical_configuration(&p, &AdapterOptions::default());
    assert_eq!(default.database.as_deref(), Some("proj"));
    assert_eq!(default.schema.as_deref(), Some("ds"));

    let options = AdapterOptions {
        database_override: Some("other".to_string()),
    };
    let overridden = adapter.canonical_configuration(&p, &options);
    assert_eq!(overridden.database.as_deref(), Some("other"));
}

#[test]
fn test_mssql_requires_driver() {
    let adapter = adapter_for(WarehouseType::MsSql);
    let err = adapter
        .build_connection_config(&profile("type: mssql\nserver: db\ndatabase: dw\n"))
        .unwrap_err();
    assert!(matches!(err, DbError::MissingProfileField { ref field, .. } if field == "driver"));

    let p = profile("type: mssql\nserver: db\ndatabase: dw\ndriver: ODBC 18\n");
    let config = adapter.build_connection_config(&p).unwrap();
    assert_eq!(config.get("MSSQL_HOST"), Some("db"));
    let canonical = adapter.canonical_configuration(&p, &AdapterOptions::default());
    assert_eq!(canonical.database.as_deref(), Some("dw"));
    assert_eq!(canonical.schema, None);
}

#[test]
fn test_mysql_tunnel_toggle() {
    let adapter = adapter_for(WarehouseType::MySql);

    let tunnel = adapter
        .build_connection_config(&profile("type: mysql\nschema: shop\nusername: u\n"))
        .unwrap();
    assert_eq!(tunnel.get("MYSQL_CONNECTION_METHOD"), Some("ssh_tunnel"));
    assert_eq!(tunnel.get("MYSQL_DATABASE"), Some("shop"));
    assert_eq!(tunnel.get("MYSQL_USER"), Some("u"));

    let direct = adapter
        .build_connection_config(&profile("type: mysql\nschema: shop\nssl_disabled: true\n"))
        .unwrap();
    assert!(!direct.contains_key("MYSQL_CONNECTION_METHOD"));
}

#[test]
fn test_redshift_default_port() {
    let adapter = adapter_for(WarehouseType::Redshift);
    let config = adapter
        .build_connection_config(&profile("type: redshift\ndbname: dev\nschema: s\n"))
        .unwrap();
    assert_eq!(config.get("REDSHIFT_PORT"), Some("5439"));
}

#[test]
fn test_snowflake_optional_credentials() {
    let adapter = adapter_for(WarehouseType::Snowflake);

    let missing_role = adapter
        .build_connection_config(&profile("type: snowflake\naccount: acc\n"))
        .unwrap_err();
    assert!(missing_role.to_string().contains("'role'"));

    let p = profile(
        "type: snowflake\naccount: acc\nrole: r\ndatabase: db\nschema: s\nprivate_key_path: /key.p8\n",
    );
    let config = adapter.build_connection_config(&p).unwrap();
    assert_eq!(config.get("SNOWFLAKE_PRIVATE_KEY_PATH"), Some("/key.p8"));
    assert!(!config.contains_key("SNOWFLAKE_PASSWORD"));
    assert!(!config.contains_key("SNOWFLAKE_PRIVATE_KEY_PASSPHRASE"));
}

#[test]
fn test_trino_catalog_and_clickhouse_database() {
    let trino = adapter_for(WarehouseType::Trino).canonical_configuration(
        &profile("type: trino\ndatabase: hive\nschema: raw\n"),
        &AdapterOptions::default(),
    );
    assert_eq!(trino.database.as_deref(), Some("hive"));
    assert_eq!(trino.schema.as_deref(), Some("raw"));

    let clickhouse = adapter_for(WarehouseType::ClickHouse);
    let p = profile("type: clickhouse\nschema: events\ndriver: http\n");
    let config = clickhouse.build_connection_config(&p).unwrap();
    assert_eq!(config.get("CLICKHOUSE_INTERFACE"), Some("http"));
    let canonical = clickhouse.canonical_configuration(&p, &AdapterOptions::default());
    assert_eq!(canonical.database.as_deref(), Some("events"));
    assert_eq!(canonical.schema, None);
}

#[test]
fn test_spark_has_no_credentials() {
    let adapter = adapter_for(WarehouseType::Spark);
    let p = profile("type: spark\nmethod: thrift\nhost: h\nschema: lake\nuser: ignored\n");
    let config = adapter.build_connection_config(&p).unwrap();
    let keys: Vec<&str> = config.keys().collect();
    assert_eq!(keys, vec!["SPARK_HOST", "SPARK_METHOD", "SPARK_SCHEMA"]);
}
