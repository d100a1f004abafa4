use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// Trino: the profile's `database` (or `catalog`) is the catalog
pub struct TrinoAdapter;

fn catalog(profile: &ProfileTarget) -> Option<String> {
    profile
        .get_string("database")
        .or_else(|| profile.get_string("catalog"))
}

impl WarehouseAdapter for TrinoAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::Trino
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("TRINO_CATALOG", catalog(profile));
        config.insert_opt("TRINO_HOST", profile.get_string("host"));
        config.insert_opt("TRINO_PASSWORD", profile.get_string("password"));
        config.insert_opt("TRINO_PORT", profile.get_string("port"));
        config.insert_opt("TRINO_SCHEMA", profile.get_string("schema"));
        config.insert_opt("TRINO_USER", profile.get_string("user"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(self.warehouse(), catalog(profile), profile.get_string("schema"))
    }
}
