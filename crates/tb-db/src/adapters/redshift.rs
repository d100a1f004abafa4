use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

const DEFAULT_PORT: &str = "5439";

/// Redshift: temporary-credential login, port defaults to 5439
pub struct RedshiftAdapter;

impl WarehouseAdapter for RedshiftAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::Redshift
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("REDSHIFT_DBNAME", profile.get_string("dbname"));
        config.insert_opt("REDSHIFT_HOST", profile.get_string("host"));
        config.insert(
            "REDSHIFT_PORT",
            profile
                .get_string("port")
                .unwrap_or_else(|| DEFAULT_PORT.to_string()),
        );
        config.insert_opt("REDSHIFT_SCHEMA", profile.get_string("schema"));
        config.insert_opt("REDSHIFT_TEMP_CRED_PASSWORD", profile.get_string("password"));
        config.insert_opt("REDSHIFT_TEMP_CRED_USER", profile.get_string("user"));
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
