use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// MySQL: the profile schema is the database; connects through an SSH
/// tunnel unless `ssl_disabled` is set.
pub struct MySqlAdapter;

impl WarehouseAdapter for MySqlAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::MySql
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        if !profile.get_bool("ssl_disabled").unwrap_or(false) {
            config.insert("MYSQL_CONNECTION_METHOD", "ssh_tunnel");
        }
        config.insert_opt("MYSQL_DATABASE", profile.get_string("schema"));
        config.insert_opt("MYSQL_HOST", profile.get_string("server"));
        config.insert_opt("MYSQL_PASSWORD", profile.get_string("password"));
        config.insert_opt("MYSQL_PORT", profile.get_string("port"));
        config.insert_opt("MYSQL_USER", profile.get_string("username"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(self.warehouse(), None, profile.get_string("schema"))
    }

    fn cascade_on_drop(&self) -> bool {
        true
    }
}
