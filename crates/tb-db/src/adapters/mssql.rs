use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// SQL Server: the ODBC driver must be named in the profile
pub struct MsSqlAdapter;

impl WarehouseAdapter for MsSqlAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::MsSql
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("MSSQL_DATABASE", profile.get_string("database"));
        config.insert("MSSQL_DRIVER", profile.required(self.warehouse(), "driver")?);
        config.insert_opt("MSSQL_HOST", profile.get_string("server"));
        config.insert_opt("MSSQL_PASSWORD", profile.get_string("password"));
        config.insert_opt("MSSQL_PORT", profile.get_string("port"));
        config.insert_opt("MSSQL_USER", profile.get_string("user"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(self.warehouse(), profile.get_string("database"), None)
    }
}
