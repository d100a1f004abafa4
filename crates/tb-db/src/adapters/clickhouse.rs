use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// ClickHouse: the profile schema is the database and the driver is
/// exposed as the client interface.
pub struct ClickHouseAdapter;

impl WarehouseAdapter for ClickHouseAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::ClickHouse
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("CLICKHOUSE_DATABASE", profile.get_string("schema"));
        config.insert_opt("CLICKHOUSE_HOST", profile.get_string("host"));
        config.insert_opt("CLICKHOUSE_INTERFACE", profile.get_string("driver"));
        config.insert_opt("CLICKHOUSE_PASSWORD", profile.get_string("password"));
        config.insert_opt("CLICKHOUSE_PORT", profile.get_string("port"));
        config.insert_opt("CLICKHOUSE_USERNAME", profile.get_string("user"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(self.warehouse(), profile.get_string("schema"), None)
    }
}
