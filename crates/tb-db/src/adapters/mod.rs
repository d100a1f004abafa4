//! One adapter per supported warehouse
//!
//! Adding a warehouse means adding a module here and an arm in
//! [`adapter_for`].

mod bigquery;
mod clickhouse;
mod mssql;
mod mysql;
mod postgres;
mod redshift;
mod snowflake;
mod spark;
mod trino;

pub use bigquery::BigQueryAdapter;
pub use clickhouse::ClickHouseAdapter;
pub use mssql::MsSqlAdapter;
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
pub use redshift::RedshiftAdapter;
pub use snowflake::SnowflakeAdapter;
pub use spark::SparkAdapter;
pub use trino::TrinoAdapter;

use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// Adapter for a warehouse type
pub fn adapter_for(warehouse: WarehouseType) -> &'static dyn WarehouseAdapter {
    match warehouse {
        WarehouseType::BigQuery => &BigQueryAdapter,
        WarehouseType::ClickHouse => &ClickHouseAdapter,
        WarehouseType::MsSql => &MsSqlAdapter,
        WarehouseType::MySql => &MySqlAdapter,
        WarehouseType::Postgres => &PostgresAdapter,
        WarehouseType::Redshift => &RedshiftAdapter,
        WarehouseType::Snowflake => &SnowflakeAdapter,
        WarehouseType::Spark => &SparkAdapter,
        WarehouseType::Trino => &TrinoAdapter,
    }
}

#[cfg(test)]
#[path = "adapters_test.rs"]
mod tests;
