//! Supported warehouse types

use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Warehouse type named by a profile target's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WarehouseType {
    BigQuery,
    ClickHouse,
    MsSql,
    MySql,
    Postgres,
    Redshift,
    Snowflake,
    Spark,
    Trino,
}

impl WarehouseType {
    pub const ALL: [WarehouseType; 9] = [
        WarehouseType::BigQuery,
        WarehouseType::ClickHouse,
        WarehouseType::MsSql,
        WarehouseType::MySql,
        WarehouseType::Postgres,
        WarehouseType::Redshift,
        WarehouseType::Snowflake,
        WarehouseType::Spark,
        WarehouseType::Trino,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WarehouseType::BigQuery => "bigquery",
            WarehouseType::ClickHouse => "clickhouse",
            WarehouseType::MsSql => "mssql",
            WarehouseType::MySql => "mysql",
            WarehouseType::Postgres => "postgres",
            WarehouseType::Redshift => "redshift",
            WarehouseType::Snowflake => "snowflake",
            WarehouseType::Spark => "spark",
            WarehouseType::Trino => "trino",
        }
    }

    /// Whether source tables must live in the profile's schema, so the
    /// schema name doubles as the source name.
    pub fn sources_live_in_profile_schema(&self) -> bool {
        matches!(
            self,
            WarehouseType::MySql
                | WarehouseType::Redshift
                | WarehouseType::Trino
                | WarehouseType::MsSql
                | WarehouseType::Spark
        )
    }
}

impl std::fmt::Display for WarehouseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for WarehouseType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        WarehouseType::ALL
            .into_iter()
            .find(|w| w.as_str() == lowered)
            .ok_or_else(|| CoreError::UnknownWarehouse {
                found: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trip() {
        for warehouse in WarehouseType::ALL {
            assert_eq!(warehouse.as_str().parse::<WarehouseType>().unwrap(), warehouse);
        }
        assert_eq!("Postgres".parse::<WarehouseType>().unwrap(), WarehouseType::Postgres);
    }

    #[test]
    fn test_unknown_warehouse() {
        assert!(matches!(
            "duckdb".parse::<WarehouseType>(),
            Err(CoreError::UnknownWarehouse { .. })
        ));
    }

    #[test]
    fn test_profile_schema_sources() {
        let schema_bound: Vec<_> = WarehouseType::ALL
            .into_iter()
            .filter(|w| w.sources_live_in_profile_schema())
            .collect();
        assert_eq!(schema_bound.len(), 5);
        assert!(!WarehouseType::Postgres.sources_live_in_profile_schema());
        assert!(WarehouseType::MySql.sources_live_in_profile_schema());
    }
}
