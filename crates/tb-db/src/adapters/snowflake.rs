use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// Snowflake: account and role are required; password and key-pair
/// settings are only forwarded when present.
pub struct SnowflakeAdapter;

impl WarehouseAdapter for SnowflakeAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::Snowflake
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert("SNOWFLAKE_ACCOUNT", profile.required(self.warehouse(), "account")?);
        config.insert_opt("SNOWFLAKE_DEFAULT_DB", profile.get_string("database"));
        config.insert_opt("SNOWFLAKE_DEFAULT_SCHEMA", profile.get_string("schema"));
        config.insert_opt("SNOWFLAKE_DEFAULT_WH", profile.get_string("warehouse"));
        config.insert_opt("SNOWFLAKE_USER", profile.get_string("user"));
        config.insert("SNOWFLAKE_ROLE", profile.required(self.warehouse(), "role")?);
        config.insert_opt("SNOWFLAKE_PASSWORD", profile.get_string("password"));
        config.insert_opt(
            "SNOWFLAKE_PRIVATE_KEY_PASSPHRASE",
            profile.get_string("private_key_passphrase"),
        );
        config.insert_opt(
            "SNOWFLAKE_PRIVATE_KEY_PATH",
            profile.get_string("private_key_path"),
        );
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        _options: &AdapterOptions,
    ) -> AdapterConfiguration {
        AdapterConfiguration::new(
            self.warehouse(),
            profile.get_string("database"),
            profile.get_string("schema"),
        )
    }
}
