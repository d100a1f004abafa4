use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// Spark: method and host only, no credentials
pub struct SparkAdapter;

impl WarehouseAdapter for SparkAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::Spark
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("SPARK_METHOD", profile.get_string("method"));
        config.insert_opt("SPARK_HOST", profile.get_string("host"));
        config.insert_opt("SPARK_SCHEMA", profile.get_string("schema"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(self.warehouse(), None, profile.get_string("schema"))
    }
}
