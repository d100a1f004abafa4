use crate::config::{AdapterConfiguration, AdapterOptions, ConnectionConfig};
use crate::error::DbResult;
use crate::profile::ProfileTarget;
use crate::traits::WarehouseAdapter;
use tb_core::WarehouseType;

/// BigQuery: authenticates with a service-account keyfile only.
///
/// The project can be overridden per call, e.g. by a model's `database` config.
pub struct BigQueryAdapter;

impl WarehouseAdapter for BigQueryAdapter {
    fn warehouse(&self) -> WarehouseType {
        WarehouseType::BigQuery
    }

    fn build_connection_config(&self, profile: &ProfileTarget) -> DbResult<ConnectionConfig> {
        let mut config = ConnectionConfig::new();
        config.insert_opt("GOOGLE_SERVICE_ACC_KEY_FILEPATH", profile.get_string("keyfile"));
        Ok(config)
    }

    fn canonical_configuration(
        &self,
        profile: &ProfileTarget,
        options: &AdapterOptions,
    ) -> AdapterConfiguration {
        let database = options
            .database_override
            .clone()
            .filter(|d| !d.is_empty())
            .or_else(|| profile.get_string("project"));
        AdapterConfiguration::new(self.warehouse(), database, profile.get_string("dataset"))
    }
}
