use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// Postgres: profile fields pass straight through
pub struct PostgresAdapter;

impl WarehouseAdapter for PostgresAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::Postgres
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("POSTGRES_DBNAME", profile.get_string("dbname"));
        config.insert_opt("POSTGRES_HOST", profile.get_string("host"));
        config.insert_opt("POSTGRES_PASSWORD", profile.get_string("password"));
        config.insert_opt("POSTGRES_PORT", profile.get_string("port"));
        config.insert_opt("POSTGRES_SCHEMA", profile.get_string("schema"));
        config.insert_opt("POSTGRES_USER", profile.get_string("user"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(
            self.warehouse(),
            profile.get_string("dbname"),
            profile.get_string("schema"),
        )
    }

    fn cascade_on_drop(&self) -> bool {
        true
    }
}
